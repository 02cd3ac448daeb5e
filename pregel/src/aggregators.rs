/*
 * SPDX-FileCopyrightText: 2026 The pregel-rs authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Named global reductions.
//!
//! An aggregator is a named value updated by merging the contributions
//! submitted by vertex programs during a superstep. Merge functions must be
//! associative and commutative.
//!
//! Contributions submitted during superstep *s* become visible at superstep
//! *s* + 1:
//!
//! - for a non-persistent aggregator, [`value_at(name,
//!   s)`](AggregatorRegistry::value_at) is the merge of the initial value with
//!   the contributions of superstep *s* − 1 only;
//! - for a persistent aggregator, it is the merge of the initial value with
//!   the contributions of supersteps 0, 1, …, *s* − 1.
//!
//! At superstep 0 every aggregator has its initial value.
//!
//! By default the registry keeps the finalized value of every superstep, so
//! its memory grows linearly with the number of supersteps. Use
//! [`keep_history`](AggregatorRegistry::keep_history) to bound it when older
//! values are not needed.
//!
//! Aggregators are typed: each one holds values of a single type, fixed at
//! registration, and reading or contributing with a different type fails with
//! [`Error::AggregatorType`].
//!
//! # Examples
//!
//! ```
//! use pregel::aggregators::AggregatorRegistry;
//!
//! let mut registry = AggregatorRegistry::new();
//! registry.register_sum::<u64>("count", true)?;
//! registry.register_sum::<f64>("mass", false)?;
//!
//! registry.aggregate("count", 2_u64)?;
//! registry.aggregate("mass", 0.5)?;
//! registry.barrier_finalize();
//! registry.aggregate("count", 3_u64)?;
//! registry.barrier_finalize();
//!
//! assert_eq!(registry.value_at::<u64>("count", 2)?, 5);
//! assert_eq!(registry.value_at::<f64>("mass", 1)?, 0.5);
//! assert_eq!(registry.value_at::<f64>("mass", 2)?, 0.0);
//! # Ok::<(), pregel::Error>(())
//! ```

use crate::{Error, Result};
use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::ops::Add;

/// A contribution to an aggregator, produced by a vertex program.
pub struct Contribution {
    name: &'static str,
    value: Box<dyn Any + Send>,
}

impl Contribution {
    pub fn new<T: Send + 'static>(name: &'static str, value: T) -> Self {
        Self {
            name,
            value: Box::new(value),
        }
    }

    /// Returns the name of the target aggregator.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl std::fmt::Debug for Contribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Contribution")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Type-erased storage of an aggregator.
trait Slot: Send + Sync {
    fn type_name(&self) -> &'static str;
    fn persistent(&self) -> bool;
    fn accepts(&self, value: &(dyn Any + Send)) -> bool;
    /// Merges a value already checked with [`accepts`](Slot::accepts).
    fn merge(&mut self, value: Box<dyn Any + Send>);
    /// Finalizes the current superstep, keeping at most `window` values.
    fn finalize(&mut self, window: Option<usize>);
    /// Drops the oldest values, keeping at most `window` of them.
    fn truncate(&mut self, window: usize);
    /// Returns `None` if the value of `step` was dropped.
    fn value_at(&self, step: usize) -> Option<&dyn Any>;
}

struct TypedSlot<T> {
    initial: T,
    merge: Box<dyn Fn(T, T) -> T + Send + Sync>,
    persistent: bool,
    accumulating: T,
    /// The value visible at superstep s + 1 is history[s - first].
    history: VecDeque<T>,
    first: usize,
}

impl<T: Clone + Send + Sync + 'static> Slot for TypedSlot<T> {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn persistent(&self) -> bool {
        self.persistent
    }

    fn accepts(&self, value: &(dyn Any + Send)) -> bool {
        value.is::<T>()
    }

    fn merge(&mut self, value: Box<dyn Any + Send>) {
        if let Ok(value) = value.downcast::<T>() {
            let acc = std::mem::replace(&mut self.accumulating, self.initial.clone());
            self.accumulating = (self.merge)(acc, *value);
        }
    }

    fn finalize(&mut self, window: Option<usize>) {
        if self.persistent {
            self.history.push_back(self.accumulating.clone());
        } else {
            let acc = std::mem::replace(&mut self.accumulating, self.initial.clone());
            self.history.push_back(acc);
        }
        if let Some(window) = window {
            self.truncate(window);
        }
    }

    fn truncate(&mut self, window: usize) {
        while self.history.len() > window {
            self.history.pop_front();
            self.first += 1;
        }
    }

    fn value_at(&self, step: usize) -> Option<&dyn Any> {
        match step {
            0 => Some(&self.initial),
            s => s
                .checked_sub(1 + self.first)
                .and_then(|i| self.history.get(i))
                .map(|value| -> &dyn Any { value }),
        }
    }
}

/// The set of aggregators of a computation.
///
/// The registry is owned by the
/// [scheduler](crate::scheduler::SuperstepScheduler), which lends it
/// read-only to vertex programs through their
/// [context](crate::program::Context) and merges their contributions at the
/// barrier.
#[derive(Default)]
pub struct AggregatorRegistry {
    slots: HashMap<&'static str, Box<dyn Slot>>,
    step: usize,
    window: Option<usize>,
}

impl std::fmt::Debug for AggregatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names = self.slots.keys().collect::<Vec<_>>();
        names.sort();
        f.debug_struct("AggregatorRegistry")
            .field("aggregators", &names)
            .field("step", &self.step)
            .field("window", &self.window)
            .finish()
    }
}

impl AggregatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an aggregator.
    ///
    /// `merge` must be associative and commutative, and `initial` should be
    /// its identity.
    pub fn register<T, F>(
        &mut self,
        name: &'static str,
        initial: T,
        merge: F,
        persistent: bool,
    ) -> Result<()>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(T, T) -> T + Send + Sync + 'static,
    {
        if self.slots.contains_key(name) {
            return Err(Error::DuplicateAggregator(name.to_string()));
        }
        // Supersteps already finalized see the initial value.
        let kept = self.window.map_or(self.step, |window| window.min(self.step));
        let history = std::iter::repeat_n(initial.clone(), kept).collect();
        self.slots.insert(
            name,
            Box::new(TypedSlot {
                accumulating: initial.clone(),
                initial,
                merge: Box::new(merge),
                persistent,
                history,
                first: self.step - kept,
            }),
        );
        log::debug!(
            "Registered {} aggregator {name:?} of type {}",
            if persistent { "persistent" } else { "regular" },
            std::any::type_name::<T>()
        );
        Ok(())
    }

    /// Registers a sum aggregator starting from the default value of `T`.
    pub fn register_sum<T>(&mut self, name: &'static str, persistent: bool) -> Result<()>
    where
        T: Clone + Default + Add<Output = T> + Send + Sync + 'static,
    {
        self.register(name, T::default(), |a, b| a + b, persistent)
    }

    /// Registers a minimum aggregator; `initial` should be an upper bound of
    /// all contributions.
    pub fn register_min<T>(&mut self, name: &'static str, initial: T, persistent: bool) -> Result<()>
    where
        T: Clone + PartialOrd + Send + Sync + 'static,
    {
        self.register(name, initial, |a, b| if b < a { b } else { a }, persistent)
    }

    /// Registers a maximum aggregator; `initial` should be a lower bound of
    /// all contributions.
    pub fn register_max<T>(&mut self, name: &'static str, initial: T, persistent: bool) -> Result<()>
    where
        T: Clone + PartialOrd + Send + Sync + 'static,
    {
        self.register(name, initial, |a, b| if b > a { b } else { a }, persistent)
    }

    /// Returns whether an aggregator is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Returns whether an aggregator is persistent.
    pub fn is_persistent(&self, name: &str) -> Result<bool> {
        Ok(self.slot(name)?.persistent())
    }

    /// Sets the number of finalized values kept by each aggregator.
    ///
    /// With `Some(w)`, [`value_at`](Self::value_at) is available only for
    /// superstep 0 and the last `w` supersteps, and fails with
    /// [`Error::StepEvicted`] for the others. `None`, the default, keeps all
    /// values.
    ///
    /// # Panics
    ///
    /// Panics if `w` is zero, as the current value must stay available.
    pub fn keep_history(&mut self, window: Option<usize>) -> &mut Self {
        if let Some(window) = window {
            assert!(window > 0, "The history window must be positive");
            for slot in self.slots.values_mut() {
                slot.truncate(window);
            }
        }
        self.window = window;
        self
    }

    /// Returns the number of finalized supersteps.
    pub fn step(&self) -> usize {
        self.step
    }

    fn slot(&self, name: &str) -> Result<&dyn Slot> {
        self.slots
            .get(name)
            .map(|slot| slot.as_ref())
            .ok_or_else(|| Error::UnknownAggregator(name.to_string()))
    }

    /// Checks that a contribution can be merged into its aggregator.
    pub(crate) fn validate(&self, contribution: &Contribution) -> Result<()> {
        let slot = self.slot(contribution.name)?;
        if slot.accepts(contribution.value.as_ref()) {
            Ok(())
        } else {
            Err(Error::AggregatorType {
                name: contribution.name.to_string(),
                expected: slot.type_name(),
            })
        }
    }

    /// Merges a contribution that passed [`validate`](Self::validate).
    pub(crate) fn merge_validated(&mut self, contribution: Contribution) {
        if let Some(slot) = self.slots.get_mut(contribution.name) {
            slot.merge(contribution.value);
        }
    }

    /// Merges `value` into the accumulating value of the current superstep.
    pub fn aggregate<T: Send + 'static>(&mut self, name: &'static str, value: T) -> Result<()> {
        let contribution = Contribution::new(name, value);
        self.validate(&contribution)?;
        self.merge_validated(contribution);
        Ok(())
    }

    /// Returns the value of an aggregator as seen at the given superstep.
    ///
    /// See the [module documentation](self) for the semantics.
    pub fn value_at<T: Clone + 'static>(&self, name: &str, step: usize) -> Result<T> {
        let slot = self.slot(name)?;
        if step > self.step {
            return Err(Error::StepOutOfRange {
                step,
                current: self.step,
            });
        }
        slot.value_at(step)
            .ok_or(Error::StepEvicted {
                step,
                current: self.step,
            })?
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| Error::AggregatorType {
                name: name.to_string(),
                expected: slot.type_name(),
            })
    }

    /// Returns the value of an aggregator as seen at the current superstep.
    pub fn value<T: Clone + 'static>(&self, name: &str) -> Result<T> {
        self.value_at(name, self.step)
    }

    /// Ends the current superstep: the accumulated values become visible and
    /// non-persistent aggregators restart from their initial value.
    pub fn barrier_finalize(&mut self) {
        for slot in self.slots.values_mut() {
            slot.finalize(self.window);
        }
        self.step += 1;
    }
}
