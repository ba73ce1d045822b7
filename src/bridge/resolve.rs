//! Selection of the overload that accepts a tuple of arguments.

use crate::bridge::Context;
use crate::bridge::convert::can_convert;
use crate::bridge::descriptor::{DescriptorCollection, MethodDescriptor, Visibility};
use crate::bridge::value::Value;

/// The outcome of overload resolution.
#[derive(Debug)]
pub enum Resolution<'a> {
    /// Exactly one overload accepts the arguments.
    Match(&'a MethodDescriptor),
    /// Several overloads accept the arguments; the first one listed was chosen.
    Ambiguous { chosen: &'a MethodDescriptor, candidates: usize },
    /// No overload accepts the arguments. `rejected` counts the visible overloads that were
    /// turned down; `incompatible` the ones among them that had the right arity.
    NoMatch { arity: usize, rejected: usize, incompatible: usize },
}

impl<'a> Resolution<'a> {
    /// The selected overload, if any.
    pub fn descriptor(&self) -> Option<&'a MethodDescriptor> {
        match *self {
            Resolution::Match(d) => Some(d),
            Resolution::Ambiguous { chosen, .. } => Some(chosen),
            Resolution::NoMatch { .. } => None,
        }
    }

    /// How many overloads were turned down; zero when one was selected.
    pub fn rejected(&self) -> usize {
        match *self {
            Resolution::NoMatch { rejected, .. } => rejected,
            _ => 0,
        }
    }
}

/// Picks the overload of `collection` that accepts `args`.
///
/// Overloads are filtered by `visibility`, then by arity, then by whether every argument can be
/// converted to its parameter. When several remain the first one wins and a warning is logged.
/// The result is not memoised.
pub fn resolve<'a>(ctx: &Context, collection: &'a DescriptorCollection, args: &[Value],
                   visibility: Visibility) -> Resolution<'a> {
    let mut visible = 0;
    let mut incompatible = 0;
    let mut candidates = Vec::new();

    for descriptor in collection.iter().filter(|d| visibility.admits(d.is_static())) {
        visible += 1;
        if descriptor.arity() != args.len() {
            continue;
        }
        let accepts = descriptor.params().iter().zip(args)
            .all(|(param, arg)| can_convert(ctx, arg, param));
        if accepts {
            candidates.push(descriptor);
        } else {
            incompatible += 1;
        }
    }

    match candidates.len() {
        0 => {
            debug!("no overload of '{}' accepts {} argument(s)", collection.name(), args.len());
            Resolution::NoMatch {
                arity: args.len(),
                rejected: visible,
                incompatible: incompatible,
            }
        },
        1 => Resolution::Match(candidates[0]),
        n => {
            warn!("call to '{}' is ambiguous between {} overloads {:?}; using {:?}",
                  collection.name(), n, candidates, candidates[0]);
            Resolution::Ambiguous {
                chosen: candidates[0],
                candidates: n,
            }
        },
    }
}
