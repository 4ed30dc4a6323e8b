// api-transport/src/params.rs
use serde_json::{Map, Value};

/// One URL parameter: a positional scalar or a query object
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Scalar(Value),
    Query(Map<String, Value>),
}

/// URL parameters, processed index by index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Vec<ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Positional values for `{0}`, `{1}`, ... placeholders
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self(
            values
                .into_iter()
                .map(|v| ParamValue::Scalar(v.into()))
                .collect(),
        )
    }

    /// Key/value pairs merged into the query string
    pub fn query(entries: Map<String, Value>) -> Self {
        Self(vec![ParamValue::Query(entries)])
    }

    pub fn push(&mut self, value: ParamValue) {
        self.0.push(value);
    }

    pub fn values(&self) -> &[ParamValue] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => ParamValue::Query(map),
            other => ParamValue::Scalar(other),
        }
    }
}

impl From<Value> for Params {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Params::new(),
            Value::Array(items) => Self(items.into_iter().map(ParamValue::from).collect()),
            other => Self(vec![ParamValue::from(other)]),
        }
    }
}

/// Percent-encode a value the way URL components expect
pub fn encode_component(value: &Value) -> String {
    match value {
        Value::String(s) => urlencoding::encode(s).into_owned(),
        other => urlencoding::encode(&other.to_string()).into_owned(),
    }
}

/// Resolve a URL template against call params.
///
/// Scalars fill the placeholder at their index; objects merge into the query
/// string, overriding same-named keys already present.
pub fn resolve_url(template: &str, params: Option<&Params>) -> String {
    let mut url = template.to_string();
    let Some(params) = params else {
        return url;
    };

    for (index, param) in params.values().iter().enumerate() {
        match param {
            ParamValue::Scalar(value) => {
                url = url.replace(&format!("{{{}}}", index), &encode_component(value));
            }
            ParamValue::Query(entries) => {
                url = merge_query(&url, entries);
            }
        }
    }

    url
}

fn merge_query(url: &str, entries: &Map<String, Value>) -> String {
    let (base, query) = match url.split_once('?') {
        Some((base, query)) => (base, query),
        None => (url, ""),
    };

    let mut pairs: Vec<(String, Option<String>)> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_string(), Some(v.to_string())),
            None => (pair.to_string(), None),
        })
        .collect();

    for (key, value) in entries {
        let key = urlencoding::encode(key).into_owned();
        let value = Some(encode_component(value));
        match pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => pairs.push((key, value)),
        }
    }

    if pairs.is_empty() {
        return base.to_string();
    }

    let query = pairs
        .into_iter()
        .map(|(k, v)| match v {
            Some(v) => format!("{}={}", k, v),
            None => k,
        })
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", base, query)
}
