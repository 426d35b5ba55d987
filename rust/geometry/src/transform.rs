// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cumulative placement transforms for nested instances and linked documents.

use nalgebra::{Matrix4, Point3};

/// Stack of cumulative transforms.
///
/// The bottom entry is the identity and is never popped, so [`current`]
/// is always defined. Every push must be matched by exactly one pop.
///
/// [`current`]: TransformStack::current
#[derive(Debug, Clone)]
pub struct TransformStack {
    stack: Vec<Matrix4<f64>>,
}

impl TransformStack {
    /// Create a stack seeded with the identity transform
    pub fn new() -> Self {
        Self {
            stack: vec![Matrix4::identity()],
        }
    }

    /// Compose `current * local` and push the result.
    pub fn push(&mut self, local: &Matrix4<f64>) {
        let composed = self.current() * local;
        self.stack.push(composed);
    }

    /// Remove the top transform.
    ///
    /// Returns `None` without touching the stack when only the identity base remains.
    pub fn pop(&mut self) -> Option<Matrix4<f64>> {
        if self.stack.len() > 1 {
            self.stack.pop()
        } else {
            None
        }
    }

    /// The cumulative transform at the top of the stack
    #[inline]
    pub fn current(&self) -> &Matrix4<f64> {
        // Seeded with identity and the base is never popped
        &self.stack[self.stack.len() - 1]
    }

    /// Transform a local point into world coordinates
    #[inline]
    pub fn transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        self.current().transform_point(p)
    }

    /// Number of entries, including the identity base
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new()
    }
}
