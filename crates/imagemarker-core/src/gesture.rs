//! Pointer-down following: the start/move/stop gesture lifecycle.
//!
//! [`PointerSurface::follow_pointer_down`] runs a procedure's `start` right
//! away and registers one move listener and one stop listener for it. Moves
//! are forwarded while they belong to the gesture's [`ButtonClass`]; the first
//! qualifying stop tears both listeners down before `stop` runs, so a gesture
//! stops exactly once and never sees another event afterwards.
//!
//! Per-gesture state is threaded through the accumulator returned by `start`
//! and each `moved` call rather than kept in outside variables.

use crate::input::{ButtonClass, Phase, PointerEvent};
use std::marker::PhantomData;

/// Callbacks of one gesture, run against a context `Cx`.
pub trait Procedure<Cx> {
    /// State threaded from `start` through every `moved` into `stop`.
    type Acc;

    fn start(&mut self, cx: &mut Cx, event: &PointerEvent) -> Self::Acc;

    fn moved(&mut self, cx: &mut Cx, event: &PointerEvent, acc: Self::Acc) -> Self::Acc;

    fn stop(self, cx: &mut Cx, event: &PointerEvent, acc: Self::Acc)
    where
        Self: Sized;
}

/// Identifier of a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Identifier of a followed gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GestureId(u64);

trait Follower<Cx> {
    fn on_move(&mut self, cx: &mut Cx, event: &PointerEvent);
    fn on_stop(self: Box<Self>, cx: &mut Cx, event: &PointerEvent);
}

struct Follow<P: Procedure<Cx>, Cx> {
    procedure: P,
    acc: Option<P::Acc>,
    _cx: PhantomData<fn(&mut Cx)>,
}

impl<P: Procedure<Cx>, Cx> Follower<Cx> for Follow<P, Cx> {
    fn on_move(&mut self, cx: &mut Cx, event: &PointerEvent) {
        if let Some(acc) = self.acc.take() {
            self.acc = Some(self.procedure.moved(cx, event, acc));
        }
    }

    fn on_stop(self: Box<Self>, cx: &mut Cx, event: &PointerEvent) {
        let Follow { procedure, acc, .. } = *self;
        if let Some(acc) = acc {
            procedure.stop(cx, event, acc);
        }
    }
}

struct Entry<Cx> {
    id: GestureId,
    class: ButtonClass,
    move_listener: ListenerId,
    stop_listener: ListenerId,
    follower: Box<dyn Follower<Cx>>,
}

/// The event target gestures listen on (the window, in a browser).
pub struct PointerSurface<Cx> {
    entries: Vec<Entry<Cx>>,
    next_id: u64,
}

impl<Cx> Default for PointerSurface<Cx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Cx> std::fmt::Debug for PointerSurface<Cx> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointerSurface")
            .field("gestures", &self.entries.len())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl<Cx> PointerSurface<Cx> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Number of registered move and stop listeners.
    pub fn listener_count(&self) -> usize {
        self.entries.len() * 2
    }

    /// Whether any gesture is being followed.
    pub fn is_following(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Listeners registered for a followed gesture.
    pub fn listeners(&self, gesture: GestureId) -> Option<(ListenerId, ListenerId)> {
        self.entries
            .iter()
            .find(|entry| entry.id == gesture)
            .map(|entry| (entry.move_listener, entry.stop_listener))
    }

    /// Start `procedure` on `initial` and follow the pointer until a `class`
    /// stop event arrives.
    pub fn follow_pointer_down<P>(
        &mut self,
        cx: &mut Cx,
        mut procedure: P,
        class: ButtonClass,
        initial: &PointerEvent,
    ) -> GestureId
    where
        P: Procedure<Cx> + 'static,
        Cx: 'static,
    {
        let id = GestureId(self.next_id());
        let move_listener = ListenerId(self.next_id());
        let stop_listener = ListenerId(self.next_id());

        let acc = procedure.start(cx, initial);
        log::debug!("Following {:?} gesture {:?}", class, id);
        self.entries.push(Entry {
            id,
            class,
            move_listener,
            stop_listener,
            follower: Box::new(Follow {
                procedure,
                acc: Some(acc),
                _cx: PhantomData,
            }),
        });
        id
    }

    /// Deliver an event to the followed gestures.
    ///
    /// Returns `true` if at least one gesture consumed it.
    pub fn dispatch(&mut self, cx: &mut Cx, event: &PointerEvent) -> bool {
        match event.phase {
            Phase::Down => false,
            Phase::Move => {
                let mut handled = false;
                for entry in self.entries.iter_mut().filter(|e| event.is_move_for(e.class)) {
                    entry.follower.on_move(cx, event);
                    handled = true;
                }
                handled
            }
            Phase::Up => {
                let (stopped, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
                    .into_iter()
                    .partition(|e| event.is_stop_for(e.class));
                // Listeners are gone before any stop callback runs.
                self.entries = kept;
                let handled = !stopped.is_empty();
                for entry in stopped {
                    log::debug!("Stopping gesture {:?}", entry.id);
                    entry.follower.on_stop(cx, event);
                }
                handled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[derive(Default)]
    struct Log {
        calls: Vec<String>,
    }

    struct Counter;

    impl Procedure<Log> for Counter {
        type Acc = u32;

        fn start(&mut self, cx: &mut Log, event: &PointerEvent) -> u32 {
            cx.calls.push(format!("start {}", event.position.x));
            0
        }

        fn moved(&mut self, cx: &mut Log, event: &PointerEvent, acc: u32) -> u32 {
            cx.calls.push(format!("move {} #{}", event.position.x, acc + 1));
            acc + 1
        }

        fn stop(self, cx: &mut Log, _: &PointerEvent, acc: u32) {
            cx.calls.push(format!("stop after {acc}"));
        }
    }

    fn event(phase: Phase, x: f64, class: Option<ButtonClass>) -> PointerEvent {
        PointerEvent::new(phase, Point::new(x, 0.0), class)
    }

    #[test]
    fn test_lifecycle_threads_accumulator() {
        let mut log = Log::default();
        let mut surface = PointerSurface::new();
        let primary = Some(ButtonClass::Primary);

        surface.follow_pointer_down(&mut log, Counter, ButtonClass::Primary, &event(Phase::Down, 1.0, primary));
        assert_eq!(surface.listener_count(), 2);

        surface.dispatch(&mut log, &event(Phase::Move, 2.0, None));
        surface.dispatch(&mut log, &event(Phase::Move, 3.0, None));
        assert!(surface.dispatch(&mut log, &event(Phase::Up, 3.0, primary)));

        assert_eq!(log.calls, vec!["start 1", "move 2 #1", "move 3 #2", "stop after 2"]);
        assert_eq!(surface.listener_count(), 0);
    }

    #[test]
    fn test_no_moves_after_stop() {
        let mut log = Log::default();
        let mut surface = PointerSurface::new();
        let primary = Some(ButtonClass::Primary);

        surface.follow_pointer_down(&mut log, Counter, ButtonClass::Primary, &event(Phase::Down, 0.0, primary));
        surface.dispatch(&mut log, &event(Phase::Up, 0.0, primary));
        assert!(!surface.dispatch(&mut log, &event(Phase::Move, 9.0, None)));
        assert!(!surface.dispatch(&mut log, &event(Phase::Up, 9.0, primary)));

        assert_eq!(log.calls, vec!["start 0", "stop after 0"]);
    }

    #[test]
    fn test_only_matching_class_stops() {
        let mut log = Log::default();
        let mut surface = PointerSurface::new();

        let id = surface.follow_pointer_down(
            &mut log,
            Counter,
            ButtonClass::Secondary,
            &event(Phase::Down, 0.0, Some(ButtonClass::Secondary)),
        );
        let (move_listener, stop_listener) = surface.listeners(id).unwrap();
        assert_ne!(move_listener, stop_listener);

        assert!(!surface.dispatch(&mut log, &event(Phase::Up, 1.0, Some(ButtonClass::Primary))));
        assert!(!surface.dispatch(&mut log, &event(Phase::Move, 1.0, Some(ButtonClass::Primary))));
        assert!(surface.is_following());

        assert!(surface.dispatch(&mut log, &event(Phase::Up, 1.0, Some(ButtonClass::Secondary))));
        assert!(surface.listeners(id).is_none());
        assert_eq!(log.calls, vec!["start 0", "stop after 0"]);
    }
}
