use crate::engine::event::Event;

/// Gets the first look at every event a device delivers.
///
/// Returning `true` absorbs the event; it will not show up in the device's
/// event queue.
pub trait EventReceiver {
    fn on_event(&mut self, event: &Event) -> bool;
}

impl<F> EventReceiver for F
where
    F: FnMut(&Event) -> bool,
{
    fn on_event(&mut self, event: &Event) -> bool {
        self(event)
    }
}
