use std::fmt::{Display, Formatter};

use crate::error::DataError;

pub const NUM_CLASSES: usize = 10;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CifarClass {
    Plane,
    Car,
    Bird,
    Cat,
    Deer,
    Dog,
    Frog,
    Horse,
    Ship,
    Truck,
}

impl CifarClass {
    pub const ALL: [CifarClass; NUM_CLASSES] = [
        CifarClass::Plane,
        CifarClass::Car,
        CifarClass::Bird,
        CifarClass::Cat,
        CifarClass::Deer,
        CifarClass::Dog,
        CifarClass::Frog,
        CifarClass::Horse,
        CifarClass::Ship,
        CifarClass::Truck,
    ];

    pub fn label(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            CifarClass::Plane => "plane",
            CifarClass::Car => "car",
            CifarClass::Bird => "bird",
            CifarClass::Cat => "cat",
            CifarClass::Deer => "deer",
            CifarClass::Dog => "dog",
            CifarClass::Frog => "frog",
            CifarClass::Horse => "horse",
            CifarClass::Ship => "ship",
            CifarClass::Truck => "truck",
        }
    }
}

impl TryFrom<u8> for CifarClass {
    type Error = DataError;

    fn try_from(label: u8) -> Result<Self, Self::Error> {
        CifarClass::ALL
            .get(label as usize)
            .copied()
            .ok_or(DataError::InvalidLabel(label))
    }
}

impl Display for CifarClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_dataset_order() {
        for (idx, class) in CifarClass::ALL.iter().enumerate() {
            assert_eq!(class.label() as usize, idx);
        }
        assert_eq!(CifarClass::try_from(0).unwrap(), CifarClass::Plane);
        assert_eq!(CifarClass::try_from(9).unwrap().to_string(), "truck");
    }

    #[test]
    fn out_of_range_label_is_rejected() {
        assert!(matches!(
            CifarClass::try_from(10),
            Err(DataError::InvalidLabel(10))
        ));
    }
}
