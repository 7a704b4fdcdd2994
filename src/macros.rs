/// A macro to build action `Params`.
///
/// # Examples
///
/// ```
/// use blocksim::params;
/// let params = params! { "arm" => -1, "b" => 0, "p" => (0, 1), "q" => (0, 2) };
/// assert_eq!(params.object("b").unwrap(), 0);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::types::Params::new()
    };
    ($( $name:expr => $value:expr ),+ $(,)?) => {
        $crate::types::Params::new()$( .with($name, $value) )+
    };
}

/// A macro to build an `Observations` map from `"object.name" => value` pairs.
///
/// Panics on a malformed key.
///
/// # Examples
///
/// ```
/// use blocksim::observations;
/// let obs = observations! { "0.movable" => false, "-1.pos" => (0, 2) };
/// assert_eq!(obs.len(), 2);
/// ```
#[macro_export]
macro_rules! observations {
    ($( $key:expr => $value:expr ),* $(,)?) => {
        {
            #[allow(unused_mut)]
            let mut observations = $crate::types::Observations::new();
            $(
                let key: $crate::types::PredicateKey = $key.parse().expect("malformed predicate key");
                observations.insert(key, $crate::types::Value::from($value));
            )*
            observations
        }
    };
}
