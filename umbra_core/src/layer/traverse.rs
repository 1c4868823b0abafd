// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Child iteration in paint order and in reverse.

use super::id::{INVALID, LayerId};
use super::store::LayerStore;

/// Direction of a [`Children`] walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Order {
    BackToFront,
    FrontToBack,
}

/// An iterator over the direct children of a layer.
///
/// Created by [`LayerStore::children`] (paint order, bottom first) or
/// [`LayerStore::children_rev`] (topmost first).
#[derive(Debug)]
pub struct Children<'a> {
    store: &'a LayerStore,
    current: u32,
    order: Order,
}

impl<'a> Children<'a> {
    pub(crate) fn back_to_front(store: &'a LayerStore, first: u32) -> Self {
        Self {
            store,
            current: first,
            order: Order::BackToFront,
        }
    }

    pub(crate) fn front_to_back(store: &'a LayerStore, last: u32) -> Self {
        Self {
            store,
            current: last,
            order: Order::FrontToBack,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = LayerId;

    fn next(&mut self) -> Option<LayerId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = match self.order {
            Order::BackToFront => self.store.next_sibling[idx as usize],
            Order::FrontToBack => self.store.prev_sibling[idx as usize],
        };
        Some(LayerId {
            idx,
            generation: self.store.generation[idx as usize],
        })
    }
}
