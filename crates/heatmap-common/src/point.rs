//! Weighted data points.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Opaque caller payload attached to a point.
pub type UserData = Arc<dyn Any + Send + Sync>;

/// A single weighted sample on the heat map.
///
/// `x` and `y` are fractions of the drawing area before padding is applied,
/// `value` is an intensity on the scale set by the map's minimum and maximum.
#[derive(Clone, Serialize, Deserialize)]
pub struct DataPoint {
    pub x: f32,
    pub y: f32,
    pub value: f64,
    #[serde(skip)]
    user_data: Option<UserData>,
}

impl DataPoint {
    pub fn new(x: f32, y: f32, value: f64) -> Self {
        Self {
            x,
            y,
            value,
            user_data: None,
        }
    }

    /// Attach a caller payload, e.g. the record this point was built from.
    pub fn with_user_data<T: Any + Send + Sync>(mut self, data: T) -> Self {
        self.user_data = Some(Arc::new(data));
        self
    }

    pub fn user_data(&self) -> Option<&UserData> {
        self.user_data.as_ref()
    }

    /// Downcast the payload to a concrete type.
    pub fn user_data_as<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.user_data.as_deref()?.downcast_ref::<T>()
    }

    /// Euclidean distance to a normalized coordinate.
    pub fn distance_to(&self, x: f32, y: f32) -> f64 {
        let dx = f64::from(x) - f64::from(self.x);
        let dy = f64::from(y) - f64::from(self.y);
        (dx * dx + dy * dy).sqrt()
    }
}

impl fmt::Debug for DataPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataPoint")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("value", &self.value)
            .field("user_data", &self.user_data.is_some())
            .finish()
    }
}

/// Points compare by position and value; payloads are not compared.
impl PartialEq for DataPoint {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y && self.value == other.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let p = DataPoint::new(0.0, 0.0, 1.0);
        assert!((p.distance_to(0.3, 0.4) - 0.5).abs() < 1e-6);
        assert_eq!(p.distance_to(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_user_data_downcast() {
        let p = DataPoint::new(0.5, 0.5, 10.0).with_user_data(String::from("station-7"));
        assert_eq!(p.user_data_as::<String>().map(String::as_str), Some("station-7"));
        assert!(p.user_data_as::<u32>().is_none());

        let clone = p.clone();
        assert!(Arc::ptr_eq(p.user_data().unwrap(), clone.user_data().unwrap()));
    }

    #[test]
    fn test_deserialize_without_payload() {
        let p: DataPoint = serde_json::from_str(r#"{"x": 0.25, "y": 0.75, "value": 3.5}"#).unwrap();
        assert_eq!(p, DataPoint::new(0.25, 0.75, 3.5));
        assert!(p.user_data().is_none());
    }
}
