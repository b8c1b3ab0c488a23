/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Spatial scope value object.

use serde::{Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};

const LONGITUDE_LIMIT: f64 = 180.0;
const LATITUDE_LIMIT: f64 = 90.0;

/// Validated `[west, south, east, north]` bounds.
///
/// Construction goes through [`BoundingBox::try_from_bounds`], so a value of this type is
/// always canonical and never needs to be checked again.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    west: f64,
    south: f64,
    east: f64,
    north: f64,
}

impl BoundingBox {
    pub fn try_from_bounds(bounds: &[f64]) -> Result<Self, BoundingBoxError> {
        let [west, south, east, north] = <[f64; 4]>::try_from(bounds)
            .map_err(|_| BoundingBoxError::WrongArity(bounds.len()))?;

        for (index, value) in [west, south, east, north].into_iter().enumerate() {
            if !value.is_finite() {
                return Err(BoundingBoxError::NotFinite(index));
            }
        }
        for longitude in [west, east] {
            if longitude.abs() > LONGITUDE_LIMIT {
                return Err(BoundingBoxError::LongitudeOutOfRange(longitude));
            }
        }
        for latitude in [south, north] {
            if latitude.abs() > LATITUDE_LIMIT {
                return Err(BoundingBoxError::LatitudeOutOfRange(latitude));
            }
        }
        if west > east || south > north {
            return Err(BoundingBoxError::Inverted);
        }

        Ok(Self {
            west,
            south,
            east,
            north,
        })
    }

    pub fn west(&self) -> f64 {
        self.west
    }

    pub fn south(&self) -> f64 {
        self.south
    }

    pub fn east(&self) -> f64 {
        self.east
    }

    pub fn north(&self) -> f64 {
        self.north
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }
}

impl Serialize for BoundingBox {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_array().serialize(serializer)
    }
}

/// Reasons a set of bounds is rejected.
#[derive(Clone, Debug, PartialEq)]
pub enum BoundingBoxError {
    WrongArity(usize),
    NotFinite(usize),
    LongitudeOutOfRange(f64),
    LatitudeOutOfRange(f64),
    Inverted,
}

impl Display for BoundingBoxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundingBoxError::WrongArity(len) => {
                write!(f, "bounding box needs exactly 4 bounds, got {len}")
            }
            BoundingBoxError::NotFinite(index) => {
                write!(f, "bounding box bound at index {index} is not a finite number")
            }
            BoundingBoxError::LongitudeOutOfRange(value) => {
                write!(f, "longitude {value} is outside [-180, 180]")
            }
            BoundingBoxError::LatitudeOutOfRange(value) => {
                write!(f, "latitude {value} is outside [-90, 90]")
            }
            BoundingBoxError::Inverted => {
                write!(f, "bounding box must be ordered west <= east and south <= north")
            }
        }
    }
}

impl Error for BoundingBoxError {}

#[cfg(test)]
mod tests {
    use super::{BoundingBox, BoundingBoxError};

    #[test]
    fn accepts_ordered_bounds() {
        let bbox = BoundingBox::try_from_bounds(&[3.78, 43.55, 4.04, 43.65])
            .expect("bounds should be valid");

        assert_eq!(bbox.to_array(), [3.78, 43.55, 4.04, 43.65]);
        assert_eq!(bbox.west(), 3.78);
        assert_eq!(bbox.north(), 43.65);
    }

    #[test]
    fn rejects_wrong_arity() {
        assert_eq!(
            BoundingBox::try_from_bounds(&[3.78, 43.55, 4.04]),
            Err(BoundingBoxError::WrongArity(3))
        );
    }

    #[test]
    fn rejects_non_finite_bound() {
        assert_eq!(
            BoundingBox::try_from_bounds(&[3.78, f64::NAN, 4.04, 43.65]),
            Err(BoundingBoxError::NotFinite(1))
        );
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert_eq!(
            BoundingBox::try_from_bounds(&[-190.0, 0.0, 10.0, 10.0]),
            Err(BoundingBoxError::LongitudeOutOfRange(-190.0))
        );
        assert_eq!(
            BoundingBox::try_from_bounds(&[0.0, 0.0, 10.0, 95.0]),
            Err(BoundingBoxError::LatitudeOutOfRange(95.0))
        );
    }

    #[test]
    fn rejects_inverted_bounds() {
        assert_eq!(
            BoundingBox::try_from_bounds(&[4.04, 43.55, 3.78, 43.65]),
            Err(BoundingBoxError::Inverted)
        );
    }

    #[test]
    fn serializes_as_plain_array() {
        let bbox = BoundingBox::try_from_bounds(&[3.78, 43.55, 4.04, 43.65])
            .expect("bounds should be valid");

        assert_eq!(
            serde_json::to_value(bbox).expect("serialize"),
            serde_json::json!([3.78, 43.55, 4.04, 43.65])
        );
    }
}
