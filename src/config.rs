/* ************************************************************************ **
** This file is part of cvkit, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Typed YAML configuration for driving a contact matrix run.
//!
//! The core types validate their inputs in their constructors, but a
//! deserialized config bypasses those, so every struct here carries a
//! `validate()` that must pass before any `build()` is trusted.

// for the _struct__field default fns
#![allow(non_snake_case)]

use crate::FailResult;

use ::std::io::Read;

use ::cvkit_adjmat::{ContactMatrix, MatrixKind, MatrixShape, Switch};
use ::cvkit_system::{Cell, PairList, PairSpace};

/// Deserialization from YAML that warns about unrecognized items.
///
/// Use this instead of calling `serde_yaml` directly; it runs the input
/// through `serde_ignored` so that misspelled config keys produce a
/// warning instead of silently doing nothing.
pub trait YamlRead: for<'de> ::serde::Deserialize<'de> {
    fn from_reader(r: impl Read) -> FailResult<Self> {
        Self::from_value(::serde_yaml::from_reader(r)?)
    }

    fn from_value(value: ::serde_yaml::Value) -> FailResult<Self>;
}

macro_rules! derive_yaml_read {
    ($Type:ty) => {
        impl YamlRead for $Type {
            fn from_value(value: ::serde_yaml::Value) -> crate::FailResult<$Type> {
                let parsed = ::serde_ignored::deserialize(
                    value,
                    |path| warn!("Unused config item (possible typo?): {}", path),
                )?;
                Ok(parsed)
            }
        }
    };
}

derive_yaml_read!{::serde_yaml::Value}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// Boundary conditions for every distance in the run.
    #[serde(default = "_settings__cell")]
    pub cell: Cell,

    pub matrix: Matrix,

    /// `None` evaluates every candidate pair on every step.
    #[serde(default)]
    pub pair_list: Option<PairListSettings>,
}
fn _settings__cell() -> Cell { Cell::Open }
derive_yaml_read!{Settings}

impl Settings {
    pub fn validate(&self) -> FailResult<()> {
        self.cell.validate()?;
        self.matrix.validate()?;
        if let Some(ref pair_list) = self.pair_list {
            pair_list.validate()?;
            // a pair list covers each unordered pair once, which cannot
            // fill both orientations of a directed matrix
            ensure!(
                !self.matrix.directed_bonds,
                "pair lists do not support directed-bonds matrices",
            );
            let reach = self.matrix.element.switch().r_max();
            ensure!(
                pair_list.cutoff >= reach,
                "pair list cutoff {} cannot see the whole switch, which reaches {}",
                pair_list.cutoff, reach,
            );
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,

    /// Store one value per unordered pair. Requires a square matrix.
    #[serde(default)]
    pub symmetric: bool,

    /// Square matrix where `(i, j)` and `(j, i)` are evaluated
    /// separately. Mutually exclusive with `symmetric`.
    #[serde(default)]
    pub directed_bonds: bool,

    pub element: Element,
}
derive_yaml_read!{Matrix}

impl Matrix {
    pub fn validate(&self) -> FailResult<()> {
        self.shape()?;
        self.element.switch().validate()
    }

    pub fn kind(&self) -> FailResult<MatrixKind> {
        MatrixKind::from_flags(self.symmetric, self.directed_bonds)
    }

    pub fn shape(&self) -> FailResult<MatrixShape> {
        MatrixShape::new(self.rows, self.cols, self.kind()?)
    }

    /// An empty matrix of the configured shape.
    pub fn build(&self) -> FailResult<ContactMatrix> {
        Ok(ContactMatrix::new(self.shape()?))
    }

    /// The candidate pairs implied by the shape: every unordered pair
    /// for the square kinds, every cross-group pair otherwise.
    pub fn pair_space(&self) -> FailResult<PairSpace> {
        Ok(match self.kind()? {
            MatrixKind::Symmetric |
            MatrixKind::DirectedBonds => PairSpace::Within { n: self.rows },
            MatrixKind::General => PairSpace::Between {
                first: self.rows,
                second: self.cols,
            },
        })
    }
}

/// What each stored pair holds, and hence what the kernel computes.
#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// The switch value itself; a soft adjacency matrix.
    #[serde(rename = "contact")] Contact(Switch),
    /// The pair distance, gated by the switch; a contact map.
    #[serde(rename = "weighted-distance")] WeightedDistance(Switch),
}

impl Element {
    pub fn switch(&self) -> &Switch {
        match *self {
            Element::Contact(ref switch) |
            Element::WeightedDistance(ref switch) => switch,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct PairListSettings {
    /// Candidate pairs farther apart than this are skipped until the
    /// next rebuild. Must cover the switch, plus whatever margin the
    /// atoms can drift between rebuilds.
    pub cutoff: f64,

    /// Rebuild every this many steps; `0` never rebuilds automatically.
    #[serde(default = "_pair_list__stride")]
    pub stride: usize,
}
fn _pair_list__stride() -> usize { 10 }
derive_yaml_read!{PairListSettings}

impl PairListSettings {
    pub fn validate(&self) -> FailResult<()> {
        ensure!(
            self.cutoff > 0.0,
            "pair list cutoff must be positive, got {}", self.cutoff,
        );
        Ok(())
    }

    pub fn build(&self, space: PairSpace) -> FailResult<PairList> {
        PairList::new(space, self.cutoff, self.stride)
    }
}

//------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = "\
cell:
  orthorhombic: [20.0, 20.0, 20.0]
matrix:
  rows: 12
  cols: 12
  symmetric: true
  element:
    contact:
      smooth-step: { begin: 1.1, end: 1.8 }
pair-list:
  cutoff: 2.5
  stride: 5
";

    #[test]
    fn example_config_parses_and_validates() {
        let settings = Settings::from_reader(EXAMPLE.as_bytes()).unwrap();
        settings.validate().unwrap();

        assert_eq!(settings.matrix.kind().unwrap(), MatrixKind::Symmetric);
        assert_eq!(settings.matrix.pair_space().unwrap(), PairSpace::Within { n: 12 });
        assert_eq!(
            *settings.matrix.element.switch(),
            Switch::SmoothStep { begin: 1.1, end: 1.8 },
        );

        let matrix = settings.matrix.build().unwrap();
        assert_eq!(matrix.shape().storage_len(), 12 * 11 / 2);

        let pair_list = settings.pair_list.as_ref().unwrap();
        assert_eq!(pair_list.stride, 5);
        let list = pair_list.build(settings.matrix.pair_space().unwrap()).unwrap();
        assert_eq!(list.len(), 12 * 11 / 2);
    }

    #[test]
    fn omitted_keys_take_defaults() {
        let yaml = "\
matrix:
  rows: 3
  cols: 4
  element:
    weighted-distance:
      rational: { r0: 0.5, r-max: 2.0 }
";
        let settings = Settings::from_reader(yaml.as_bytes()).unwrap();
        settings.validate().unwrap();

        assert_eq!(settings.cell, Cell::Open);
        assert_eq!(settings.pair_list, None);
        assert_eq!(settings.matrix.kind().unwrap(), MatrixKind::General);
        assert_eq!(
            *settings.matrix.element.switch(),
            Switch::Rational { d0: 0.0, r0: 0.5, n: 6, m: 12, r_max: 2.0 },
        );
        assert_eq!(
            settings.matrix.pair_space().unwrap(),
            PairSpace::Between { first: 3, second: 4 },
        );
    }

    #[test]
    fn conflicting_mode_flags_are_rejected() {
        let yaml = "\
matrix:
  rows: 3
  cols: 3
  symmetric: true
  directed-bonds: true
  element:
    contact:
      smooth-step: { begin: 0.5, end: 1.0 }
";
        let settings = Settings::from_reader(yaml.as_bytes()).unwrap();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("both"));
    }

    #[test]
    fn validation_sees_through_serde() {
        // values the constructors would reject must not sneak in via yaml
        let yaml = "\
cell:
  orthorhombic: [10.0, -1.0, 10.0]
matrix:
  rows: 4
  cols: 4
  symmetric: true
  element:
    contact:
      smooth-step: { begin: 1.5, end: 0.5 }
";
        let settings = Settings::from_reader(yaml.as_bytes()).unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn pair_lists_refuse_directed_matrices() {
        let yaml = "\
matrix:
  rows: 4
  cols: 4
  directed-bonds: true
  element:
    contact:
      smooth-step: { begin: 1.1, end: 1.8 }
pair-list:
  cutoff: 2.5
";
        let settings = Settings::from_reader(yaml.as_bytes()).unwrap();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("directed"));
    }

    #[test]
    fn short_pair_list_cutoffs_are_rejected() {
        let yaml = "\
matrix:
  rows: 4
  cols: 4
  symmetric: true
  element:
    contact:
      smooth-step: { begin: 1.1, end: 1.8 }
pair-list:
  cutoff: 1.5
";
        let settings = Settings::from_reader(yaml.as_bytes()).unwrap();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("switch"));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(Settings::from_reader("matrix: [what".as_bytes()).is_err());
        assert!(Settings::from_reader("rows: 3".as_bytes()).is_err());
    }
}
