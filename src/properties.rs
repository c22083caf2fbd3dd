use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Display;

/// Well-known property keys written by the fluent chain.
pub mod keys {
    pub const URL: &str = "Url";
    pub const REQUEST_METHOD: &str = "RequestMethod";
    pub const STATUS_CODE: &str = "StatusCode";
    pub const RESPONSE_HEADERS: &str = "ResponseHeaders";
    pub const RESPONSE_BODY: &str = "ResponseBody";
    pub const TAGS: &str = "Tags";
    pub const SQL: &str = "Sql";
    pub const SQL_PARAMETERS: &str = "SqlParameters";
}

/// Ordered key/value bag attached to a single [`crate::record::LogEvent`].
///
/// Keys are unique and iterate in sorted order; setting an existing key
/// replaces its value. Insertion order is not kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, Value>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Value of `key` if it is stored as text.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Store the result of `value` under `key`, or a diagnostic string if
    /// it fails. Never propagates the failure.
    pub fn safe_set<F, E>(&mut self, key: &str, value: F)
    where
        F: FnOnce() -> Result<Value, E>,
        E: Display,
    {
        let value = value().unwrap_or_else(|e| {
            Value::String(format!(
                "Failed setting {} key in logger because {}",
                key, e
            ))
        });
        self.0.insert(key.to_string(), value);
    }

    /// Store a [`DataValue`]; numeric values get a type-suffixed key.
    pub fn set_data<V: DataValue>(&mut self, key: &str, value: V) {
        value.store(key, self);
    }

    /// Append tags to the `Tags` property.
    pub fn add_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut joined = self.get_str(keys::TAGS).unwrap_or_default().to_string();
        for tag in tags {
            if !joined.is_empty() {
                joined.push_str(", ");
            }
            joined.push_str(tag.as_ref());
        }
        self.set(keys::TAGS, joined);
    }

    /// Record a SQL statement and its bound parameters.
    pub fn set_sql<I, K, V>(&mut self, sql: &str, parameters: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Display,
    {
        self.set(keys::SQL, sql);
        let parameters = to_query(
            parameters
                .into_iter()
                .map(|(name, value)| (name.as_ref().to_string(), value.to_string())),
        );
        self.set(keys::SQL_PARAMETERS, parameters);
    }

    /// Store a serializable value as JSON text.
    pub fn set_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        self.safe_set(key, || serde_json::to_string(value).map(Value::String));
    }
}

impl<'a> IntoIterator for &'a Properties {
    type Item = (&'a String, &'a Value);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Join `name=value` pairs with `&`, URL-encoding both sides.
pub(crate) fn to_query<I, K, V>(pairs: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    pairs
        .into_iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                urlencoding::encode(k.as_ref()),
                urlencoding::encode(v.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// A value accepted by the fluent `data` call.
pub trait DataValue {
    fn store(self, key: &str, properties: &mut Properties);
}

impl DataValue for &str {
    fn store(self, key: &str, properties: &mut Properties) {
        properties.set(key, self);
    }
}

impl DataValue for String {
    fn store(self, key: &str, properties: &mut Properties) {
        properties.set(key, self);
    }
}

impl DataValue for &String {
    fn store(self, key: &str, properties: &mut Properties) {
        properties.set(key, self.as_str());
    }
}

impl DataValue for bool {
    fn store(self, key: &str, properties: &mut Properties) {
        properties.set(key, self.to_string());
    }
}

// One key per numeric type: `name+Int32`, `name+Int64`, ...
macro_rules! numeric_data_value {
    ($($ty:ty => $suffix:literal),* $(,)?) => {
        $(
            impl DataValue for $ty {
                fn store(self, key: &str, properties: &mut Properties) {
                    properties.set(format!("{}+{}", key, $suffix), self.to_string());
                }
            }
        )*
    };
}

numeric_data_value! {
    i8 => "SByte",
    i16 => "Int16",
    i32 => "Int32",
    i64 => "Int64",
    isize => "IntPtr",
    u8 => "Byte",
    u16 => "UInt16",
    u32 => "UInt32",
    u64 => "UInt64",
    usize => "UIntPtr",
    f32 => "Single",
    f64 => "Double",
    Decimal => "Decimal",
}
