// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ids::ItemId;

// Pointer travel, in pixels, before a press becomes a drag.
pub const DEFAULT_ACTIVATION_DISTANCE: f64 = 8.0;

pub fn array_move<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let mut moved = items.to_vec();
    if from >= moved.len() || to >= moved.len() || from == to {
        return moved;
    }
    let item = moved.remove(from);
    moved.insert(to, item);
    moved
}

pub fn position_of<T, F>(items: &[T], id_fn: F, id: &ItemId) -> Option<usize>
where
    F: Fn(&T, usize) -> ItemId,
{
    items
        .iter()
        .enumerate()
        .position(|(index, item)| id_fn(item, index) == *id)
}

pub fn reorder<T, F>(items: &[T], id_fn: F, source: &ItemId, destination: &ItemId) -> Option<Vec<T>>
where
    T: Clone,
    F: Fn(&T, usize) -> ItemId,
{
    if source == destination {
        return None;
    }
    let from = position_of(items, &id_fn, source)?;
    let to = position_of(items, &id_fn, destination)?;
    Some(array_move(items, from, to))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn distance_to(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq)]
enum Gesture {
    Idle,
    Pressed { active: ItemId, origin: Point },
    Pointer { active: ItemId },
    Keyboard { active: ItemId, over: ItemId },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReorderController {
    activation_distance: f64,
    gesture: Gesture,
}

impl Default for ReorderController {
    fn default() -> Self {
        Self {
            activation_distance: DEFAULT_ACTIVATION_DISTANCE,
            gesture: Gesture::Idle,
        }
    }
}

impl ReorderController {
    pub fn with_activation_distance(distance: f64) -> Self {
        Self {
            activation_distance: distance.max(0.0),
            gesture: Gesture::Idle,
        }
    }

    pub fn activation_distance(&self) -> f64 {
        self.activation_distance
    }

    pub fn active(&self) -> Option<&ItemId> {
        match &self.gesture {
            Gesture::Pointer { active } | Gesture::Keyboard { active, .. } => Some(active),
            Gesture::Idle | Gesture::Pressed { .. } => None,
        }
    }

    pub fn keyboard_target(&self) -> Option<&ItemId> {
        match &self.gesture {
            Gesture::Keyboard { over, .. } => Some(over),
            _ => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.active().is_some()
    }

    pub fn pointer_down(&mut self, id: impl Into<ItemId>, at: Point) {
        self.gesture = Gesture::Pressed {
            active: id.into(),
            origin: at,
        };
    }

    pub fn pointer_move(&mut self, at: Point) -> bool {
        match &self.gesture {
            Gesture::Pressed { active, origin }
                if origin.distance_to(at) >= self.activation_distance =>
            {
                self.gesture = Gesture::Pointer {
                    active: active.clone(),
                };
                true
            }
            Gesture::Pointer { .. } => true,
            _ => false,
        }
    }

    // Ends a pointer gesture over `over`. A press that never crossed the
    // activation distance is a click and never reorders.
    pub fn pointer_up<T, F, C>(
        &mut self,
        over: Option<&ItemId>,
        items: &[T],
        id_fn: F,
        on_reorder: C,
    ) -> bool
    where
        T: Clone,
        F: Fn(&T, usize) -> ItemId,
        C: FnOnce(Vec<T>),
    {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        let Gesture::Pointer { active } = gesture else {
            return false;
        };
        finish(&active, over, items, id_fn, on_reorder)
    }

    pub fn pointer_cancel(&mut self) {
        if matches!(
            self.gesture,
            Gesture::Pressed { .. } | Gesture::Pointer { .. }
        ) {
            self.gesture = Gesture::Idle;
        }
    }

    pub fn key_pick(&mut self, id: impl Into<ItemId>) {
        let active = id.into();
        self.gesture = Gesture::Keyboard {
            over: active.clone(),
            active,
        };
    }

    pub fn key_move<T, F>(&mut self, direction: KeyDirection, items: &[T], id_fn: F) -> Option<&ItemId>
    where
        F: Fn(&T, usize) -> ItemId,
    {
        let Gesture::Keyboard { over, .. } = &mut self.gesture else {
            return None;
        };
        if let Some(current) = position_of(items, &id_fn, over) {
            let next = match direction {
                KeyDirection::Up => current.saturating_sub(1),
                KeyDirection::Down => (current + 1).min(items.len() - 1),
            };
            *over = id_fn(&items[next], next);
        }
        Some(&*over)
    }

    pub fn key_drop<T, F, C>(&mut self, items: &[T], id_fn: F, on_reorder: C) -> bool
    where
        T: Clone,
        F: Fn(&T, usize) -> ItemId,
        C: FnOnce(Vec<T>),
    {
        if !matches!(self.gesture, Gesture::Keyboard { .. }) {
            return false;
        }
        let Gesture::Keyboard { active, over } =
            std::mem::replace(&mut self.gesture, Gesture::Idle)
        else {
            return false;
        };
        finish(&active, Some(&over), items, id_fn, on_reorder)
    }

    pub fn key_cancel(&mut self) {
        if matches!(self.gesture, Gesture::Keyboard { .. }) {
            self.gesture = Gesture::Idle;
        }
    }
}

fn finish<T, F, C>(
    active: &ItemId,
    over: Option<&ItemId>,
    items: &[T],
    id_fn: F,
    on_reorder: C,
) -> bool
where
    T: Clone,
    F: Fn(&T, usize) -> ItemId,
    C: FnOnce(Vec<T>),
{
    let Some(over) = over else {
        return false;
    };
    match reorder(items, id_fn, active, over) {
        Some(next) => {
            on_reorder(next);
            true
        }
        None => false,
    }
}
