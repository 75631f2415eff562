use crate::events::{EventInbox, EventReceiver, NativeEvent};
use crate::pixmap::PixmapInput;
use crossbeam::channel::TryRecvError;
use log::{error, trace};
use perch_core::{Backend, Config, Error, FrameReport, Id, LeafKind, NVTree, NodeKey, NodeKind};
use std::collections::HashMap;

/// Connects immediate-mode declarations to a native backend.
///
/// Declare widgets every frame (see the widget methods), then call [`update`](Host::update) to
/// complete the frame and collect the events for the next one.
pub struct Host<B: Backend> {
    pub tree: NVTree<B>,
    event_recv: EventReceiver<B::Handle>,
    pub(crate) inbox: EventInbox<B::Handle>,
    /// The innermost window declared in this frame.
    pub(crate) window: Option<B::Handle>,
    pub(crate) pixmaps: HashMap<Id, PixmapInput>,
    /// The first fault of the current frame.
    fault: Option<Error<B::Error>>,
}

impl<B: Backend> Host<B> {
    /// Creates a new Host.
    ///
    /// The backend should send native events through the sender belonging to `event_recv`.
    pub fn new(backend: B, event_recv: EventReceiver<B::Handle>) -> Host<B> {
        Host::with_config(backend, event_recv, Config::default())
    }

    pub fn with_config(
        backend: B,
        event_recv: EventReceiver<B::Handle>,
        config: Config,
    ) -> Host<B> {
        Host {
            tree: NVTree::with_config(backend, config),
            event_recv,
            inbox: EventInbox::new(),
            window: None,
            pixmaps: HashMap::new(),
            fault: None,
        }
    }

    /// Completes the frame and collects the events for the next one.
    ///
    /// If any declaration in this frame failed, returns the first failure.
    pub fn update(&mut self) -> Result<FrameReport, Error<B::Error>> {
        let result = self.tree.complete_frame();
        self.window = None;
        self.inbox.clear();
        let tree = &self.tree;
        self.pixmaps.retain(|id, _| {
            tree.kind(NodeKey::Leaf(*id)) == Some(NodeKind::Leaf(LeafKind::Pixmap))
        });
        self.poll();

        match self.fault.take() {
            Some(fault) => Err(fault),
            None => result,
        }
    }

    /// Receives all events from the event queue. Events for widgets that no longer exist are
    /// discarded.
    pub fn poll(&mut self) {
        loop {
            match self.event_recv.try_recv() {
                Ok(event) => self.inbox.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    trace!("event sender has been disconnected");
                    break;
                }
            }
        }

        let tree = &self.tree;
        self.inbox.retain(|target| tree.find(target).is_some());
    }

    /// Queues an event as if the backend had sent it.
    pub fn push_event(&mut self, event: NativeEvent<B::Handle>) {
        self.inbox.push(event);
    }

    /// Pointer input of a pixmap, as of its declaration in this frame.
    pub fn pixmap_input(&self, id: Id) -> Option<&PixmapInput> {
        self.pixmaps.get(&id)
    }

    /// The first fault of the current frame, if any.
    pub fn fault(&self) -> Option<&Error<B::Error>> {
        self.fault.as_ref()
    }

    /// Tears down every widget.
    pub fn cleanup(&mut self) -> Result<(), Error<B::Error>> {
        self.inbox.clear();
        self.window = None;
        self.pixmaps.clear();
        self.fault = None;
        self.tree.cleanup()
    }

    /// Unwraps a declaration result, keeping the first fault for [`update`](Host::update).
    pub(crate) fn record<T>(&mut self, result: Result<T, Error<B::Error>>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(Error::FrameAborted) => None,
            Err(err) => {
                if self.fault.is_none() {
                    self.fault = Some(err);
                }
                None
            }
        }
    }
}

impl<B: Backend> Drop for Host<B> {
    fn drop(&mut self) {
        if let Err(err) = self.cleanup() {
            error!("failed to clean up: {}", err);
        }
    }
}
