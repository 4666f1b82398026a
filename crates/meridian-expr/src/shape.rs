//! Fixed-size multi-dimensional variable collections.
//!
//! Enumeration is row-major: the last dimension varies fastest. The same
//! order drives element naming and the flat position of each variable.

use crate::error::ExprError;
use crate::variable::{Bounds, ShapePosition, Variable, VariableKind, resolve_bounds};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Rejects empty or zero dimensions and element counts beyond `usize`.
    pub fn new(dims: &[usize]) -> Result<Self, ExprError> {
        let size = dims
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim));
        if dims.is_empty() || dims.contains(&0) || size.is_none() {
            return Err(ExprError::InvalidShape {
                dims: dims.to_vec(),
            });
        }
        Ok(Self {
            dims: dims.to_vec(),
        })
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Total number of elements; `new` guarantees this fits in `usize`.
    pub fn size(&self) -> usize {
        self.dims.iter().product()
    }

    /// Row-major flat position of a multi-index.
    pub fn flat_index(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.dims.len() {
            return None;
        }
        let mut flat = 0;
        for (&i, &dim) in index.iter().zip(&self.dims) {
            if i >= dim {
                return None;
            }
            flat = flat * dim + i;
        }
        Some(flat)
    }

    pub fn unflatten(&self, flat: usize) -> Option<Vec<usize>> {
        if flat >= self.size() {
            return None;
        }
        let mut index = vec![0; self.dims.len()];
        let mut rest = flat;
        for (slot, &dim) in index.iter_mut().zip(&self.dims).rev() {
            *slot = rest % dim;
            rest /= dim;
        }
        Some(index)
    }

    /// All multi-indices in enumeration order.
    pub fn indices(&self) -> impl Iterator<Item = Vec<usize>> + '_ {
        (0..self.size()).filter_map(move |flat| self.unflatten(flat))
    }
}

/// Variables declared over a [`Shape`], stored in flat order.
#[derive(Debug, Clone)]
pub struct VariableArray {
    name: Arc<str>,
    shape: Shape,
    variables: Vec<Variable>,
}

impl VariableArray {
    pub fn declare(dims: &[usize], kind: VariableKind, pattern: &str) -> Result<Self, ExprError> {
        Self::build(dims, kind, None, pattern)
    }

    pub fn declare_bounded(
        dims: &[usize],
        kind: VariableKind,
        bounds: Bounds,
        pattern: &str,
    ) -> Result<Self, ExprError> {
        Self::build(dims, kind, Some(bounds), pattern)
    }

    fn build(
        dims: &[usize],
        kind: VariableKind,
        bounds: Option<Bounds>,
        pattern: &str,
    ) -> Result<Self, ExprError> {
        let shape = Shape::new(dims)?;
        let bounds = resolve_bounds(kind, bounds)?;
        let name: Arc<str> = base_name(pattern).into();
        let variables = shape
            .indices()
            .enumerate()
            .map(|(flat, index)| {
                let position = ShapePosition {
                    shape: Arc::clone(&name),
                    index,
                    flat,
                };
                Variable::declare_at(kind, bounds, element_name(pattern, flat), position)
            })
            .collect();
        Ok(Self {
            name,
            shape,
            variables,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn get(&self, index: &[usize]) -> Option<&Variable> {
        self.shape
            .flat_index(index)
            .and_then(|flat| self.variables.get(flat))
    }

    pub fn get_flat(&self, flat: usize) -> Option<&Variable> {
        self.variables.get(flat)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Variable> {
        self.variables.iter()
    }

    pub fn as_slice(&self) -> &[Variable] {
        &self.variables
    }
}

impl std::ops::Index<usize> for VariableArray {
    type Output = Variable;

    fn index(&self, flat: usize) -> &Self::Output {
        &self.variables[flat]
    }
}

impl<'a> IntoIterator for &'a VariableArray {
    type Item = &'a Variable;
    type IntoIter = std::slice::Iter<'a, Variable>;

    fn into_iter(self) -> Self::IntoIter {
        self.variables.iter()
    }
}

/// Declare one variable per index combination of `dims`.
///
/// Element `k` is named by replacing the first `{}` in `pattern` with `k`,
/// or by appending `_k` when the pattern has no placeholder.
pub fn declare_shape(
    dims: &[usize],
    kind: VariableKind,
    pattern: &str,
) -> Result<VariableArray, ExprError> {
    VariableArray::declare(dims, kind, pattern)
}

pub fn declare_shape_bounded(
    dims: &[usize],
    kind: VariableKind,
    bounds: Bounds,
    pattern: &str,
) -> Result<VariableArray, ExprError> {
    VariableArray::declare_bounded(dims, kind, bounds, pattern)
}

fn element_name(pattern: &str, flat: usize) -> String {
    if pattern.contains("{}") {
        pattern.replacen("{}", &flat.to_string(), 1)
    } else {
        format!("{pattern}_{flat}")
    }
}

fn base_name(pattern: &str) -> &str {
    let prefix = pattern.split("{}").next().unwrap_or(pattern);
    let trimmed = prefix.trim_end_matches('_');
    if trimmed.is_empty() { pattern } else { trimmed }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_and_empty_dims() {
        assert_eq!(
            Shape::new(&[3, 0]).unwrap_err(),
            ExprError::InvalidShape { dims: vec![3, 0] }
        );
        assert!(Shape::new(&[]).is_err());
    }

    #[test]
    fn rejects_overflowing_element_count() {
        assert_eq!(
            Shape::new(&[usize::MAX, 2]).unwrap_err(),
            ExprError::InvalidShape {
                dims: vec![usize::MAX, 2]
            }
        );
        assert!(Shape::new(&[1 << 30, 1 << 30, 1 << 30]).is_err());
        assert_eq!(Shape::new(&[usize::MAX, 1]).map(|s| s.size()), Ok(usize::MAX));
    }

    #[test]
    fn row_major_flattening() {
        let shape = Shape::new(&[2, 3]).expect("valid shape");
        assert_eq!(shape.size(), 6);
        assert_eq!(shape.flat_index(&[0, 0]), Some(0));
        assert_eq!(shape.flat_index(&[0, 2]), Some(2));
        assert_eq!(shape.flat_index(&[1, 0]), Some(3));
        assert_eq!(shape.flat_index(&[1, 3]), None);
        assert_eq!(shape.flat_index(&[1]), None);
        assert_eq!(shape.unflatten(4), Some(vec![1, 1]));
        assert_eq!(shape.unflatten(6), None);
    }

    #[test]
    fn indices_follow_flat_order() {
        let shape = Shape::new(&[2, 2]).expect("valid shape");
        let all: Vec<_> = shape.indices().collect();
        assert_eq!(all, vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]]);
    }

    #[test]
    fn pattern_placeholder_is_replaced() {
        let arr = declare_shape(&[3], VariableKind::Binary, "company_{}").expect("valid");
        let names: Vec<_> = arr.iter().map(Variable::name).collect();
        assert_eq!(names, vec!["company_0", "company_1", "company_2"]);
        assert_eq!(arr.name(), "company");
    }

    #[test]
    fn pattern_without_placeholder_gets_suffix() {
        let arr = declare_shape(&[2, 2], VariableKind::Integer, "flow").expect("valid");
        assert_eq!(arr[3].name(), "flow_3");
        let position = arr[3].position().expect("shape member");
        assert_eq!(&*position.shape, "flow");
        assert_eq!(position.index, vec![1, 1]);
        assert_eq!(position.flat, 3);
    }

    #[test]
    fn position_serializes_with_shape_name() {
        let arr = declare_shape(&[2, 2], VariableKind::Binary, "pick_{}").expect("valid");
        let position = arr[2].position().expect("shape member");
        let json = serde_json::to_value(position).expect("serializable");
        assert_eq!(
            json,
            serde_json::json!({"shape": "pick", "index": [1, 0], "flat": 2})
        );
    }

    #[test]
    fn lookup_by_multi_index() {
        let arr = declare_shape(&[2, 3], VariableKind::Continuous, "x{}").expect("valid");
        let v = arr.get(&[1, 2]).expect("in range");
        assert_eq!(v.name(), "x5");
        assert_eq!(arr.get_flat(5).map(Variable::id), Some(v.id()));
        assert!(arr.get(&[2, 0]).is_none());
    }

    #[test]
    fn bounded_shape_applies_bounds_to_each_member() {
        let arr = declare_shape_bounded(&[2], VariableKind::UInteger, Bounds::new(0.0, 4.0), "q")
            .expect("valid");
        assert!(arr.iter().all(|v| v.bounds() == Bounds::new(0.0, 4.0)));
        assert!(
            declare_shape_bounded(&[2], VariableKind::Binary, Bounds::new(3.0, 4.0), "q").is_err()
        );
    }

    #[test]
    fn members_have_distinct_identities() {
        let arr = declare_shape(&[4], VariableKind::Binary, "b{}").expect("valid");
        let mut ids: Vec<_> = arr.iter().map(Variable::id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }
}
