use serde::{Deserialize, Deserializer};

/// A single field of a partial update.
///
/// Distinguishes a key that was left out of the payload (`Absent`) from one
/// that was sent as `null` (`Null`). Use with `#[serde(default)]` so missing
/// keys deserialize to `Absent`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<T: Clone> Patch<T> {
    /// Overwrite `target` when a value is present; `Absent` and `Null` leave it alone
    pub fn apply_to(&self, target: &mut T) {
        if let Patch::Value(v) = self {
            *target = v.clone();
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default)]
        name: Patch<String>,
    }

    #[test]
    fn missing_key_is_absent() {
        let p: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(p.name, Patch::Absent);
    }

    #[test]
    fn explicit_null_is_null() {
        let p: Probe = serde_json::from_str(r#"{"name": null}"#).unwrap();
        assert_eq!(p.name, Patch::Null);
    }

    #[test]
    fn value_is_kept() {
        let p: Probe = serde_json::from_str(r#"{"name": "Kite"}"#).unwrap();
        assert_eq!(p.name, Patch::Value("Kite".to_string()));
    }

    #[test]
    fn wrong_type_fails() {
        assert!(serde_json::from_str::<Probe>(r#"{"name": 5}"#).is_err());
    }

    #[test]
    fn apply_only_overwrites_values() {
        let mut target = "Ball".to_string();
        Patch::<String>::Absent.apply_to(&mut target);
        Patch::<String>::Null.apply_to(&mut target);
        assert_eq!(target, "Ball");
        Patch::Value("Kite".to_string()).apply_to(&mut target);
        assert_eq!(target, "Kite");
    }
}
