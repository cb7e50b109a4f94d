// Build a ParameterSet using params!("name" => "foo", "spec.replicas" => 3) syntax; values are
// anything serde_json::json! accepts
#[macro_export]
macro_rules! params {
    () => {
        $crate::mapper::ParameterSet::new()
    };
    ($($key:expr => $val:tt),+$(,)?) => {
        $crate::mapper::ParameterSet::from([$(($key.to_string(), serde_json::json!($val))),+])
    };
}
