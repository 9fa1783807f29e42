use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::gateway::{Gateway, GatewayError, MutationResponse, UploadFile, UploadResponse};
use crate::model::{EntityId, ResourceKind, Referenceable};

use super::{
    ActionDialog, DetailPanel, FormModel, HydrateFetch, ListController, ListFetch, PickerFetch,
    PrimaryFetch, ReferencePicker, SubmitFetch, TabFetch,
};

type Completion<S> = Box<dyn FnOnce(&mut S, &mut Dispatcher<S>) + Send>;

/// Runs gateway requests on the tokio runtime and hands their results back
/// to single-threaded view state `S`.
///
/// Requests run concurrently; completions are applied in arrival order by
/// whoever owns `S` (the TUI tick, or a test awaiting [`apply_next`]). A
/// completion may spawn follow-up requests through the dispatcher it is
/// given.
///
/// [`apply_next`]: Dispatcher::apply_next
pub struct Dispatcher<S> {
    handle: Handle,
    tx: mpsc::UnboundedSender<Completion<S>>,
    rx: mpsc::UnboundedReceiver<Completion<S>>,
    in_flight: usize,
}

impl<S> std::fmt::Debug for Dispatcher<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl<S: 'static> Dispatcher<S> {
    pub fn new(handle: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            handle,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Dispatcher on the runtime of the calling task.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Requests spawned whose completion has not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn spawn<T, Fut, A>(&mut self, fut: Fut, apply: A)
    where
        T: Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        A: FnOnce(&mut S, &mut Dispatcher<S>, T) + Send + 'static,
    {
        let tx = self.tx.clone();
        self.in_flight += 1;
        self.handle.spawn(async move {
            let out = fut.await;
            let completion: Completion<S> = Box::new(move |state, d| apply(state, d, out));
            // The receiver lives as long as the dispatcher; a send error only
            // means the owner is gone.
            let _ = tx.send(completion);
        });
    }

    /// Applies every completion that has already arrived, without waiting.
    pub fn drain(&mut self, state: &mut S) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            completion(state, self);
            applied += 1;
        }
        applied
    }

    /// Waits for the next completion and applies it. Returns false when
    /// nothing is in flight.
    pub async fn apply_next(&mut self, state: &mut S) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.rx.recv().await {
            Some(completion) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                completion(state, self);
                true
            }
            None => false,
        }
    }

    /// Applies completions until nothing is in flight, including follow-ups
    /// spawned along the way.
    pub async fn settle(&mut self, state: &mut S) -> usize {
        let mut applied = 0;
        while self.apply_next(state).await {
            applied += 1;
        }
        applied
    }

    pub fn list<G, T>(
        &mut self,
        gateway: &Arc<G>,
        fetch: ListFetch,
        select: fn(&mut S) -> Option<&mut ListController<T>>,
    ) where
        G: Gateway,
        T: DeserializeOwned + Send + 'static,
    {
        let gw = Arc::clone(gateway);
        let ListFetch { ticket, query } = fetch;
        self.spawn(async move { gw.list::<T>(query).await }, move |s, _, result| {
            if let Some(list) = select(s) {
                list.commit(ticket, result);
            }
        });
    }

    pub fn picker<G, T>(
        &mut self,
        gateway: &Arc<G>,
        fetch: PickerFetch,
        select: fn(&mut S) -> Option<&mut ReferencePicker<T>>,
    ) where
        G: Gateway,
        T: Referenceable + DeserializeOwned + Send + 'static,
    {
        let gw = Arc::clone(gateway);
        let PickerFetch { ticket, query } = fetch;
        self.spawn(async move { gw.list::<T>(query).await }, move |s, _, result| {
            if let Some(picker) = select(s) {
                picker.commit(ticket, result);
            }
        });
    }

    pub fn primary<G, T, U>(
        &mut self,
        gateway: &Arc<G>,
        fetch: PrimaryFetch,
        select: fn(&mut S) -> Option<&mut DetailPanel<T, U>>,
    ) where
        G: Gateway,
        T: DeserializeOwned + Send + 'static,
        U: 'static,
    {
        let gw = Arc::clone(gateway);
        let (kind, id) = (fetch.kind, fetch.id);
        self.spawn(async move { gw.get::<T>(kind, id).await }, move |s, _, result| {
            if let Some(panel) = select(s) {
                panel.commit_primary(&fetch, result);
            }
        });
    }

    pub fn tab<G, T, U>(
        &mut self,
        gateway: &Arc<G>,
        fetch: TabFetch,
        select: fn(&mut S) -> Option<&mut DetailPanel<T, U>>,
    ) where
        G: Gateway,
        T: 'static,
        U: DeserializeOwned + Send + 'static,
    {
        let gw = Arc::clone(gateway);
        let query = fetch.query.clone();
        self.spawn(async move { gw.list::<U>(query).await }, move |s, _, result| {
            if let Some(panel) = select(s) {
                panel.commit_tab(&fetch, result);
            }
        });
    }

    pub fn hydrate<G, F>(
        &mut self,
        gateway: &Arc<G>,
        fetch: HydrateFetch,
        select: fn(&mut S) -> Option<&mut ActionDialog<F>>,
    ) where
        G: Gateway,
        F: FormModel + 'static,
        F::Entity: DeserializeOwned + Send + 'static,
    {
        let gw = Arc::clone(gateway);
        let HydrateFetch { ticket, kind, id } = fetch;
        self.spawn(
            async move { gw.get::<F::Entity>(kind, id).await },
            move |s, _, result| {
                if let Some(dialog) = select(s) {
                    dialog.commit_hydrate(ticket, result);
                }
            },
        );
    }

    /// Sends a dialog's mutation; `apply` commits it to whichever dialog
    /// issued it and acts on the outcome.
    pub fn submit<G, A>(&mut self, gateway: &Arc<G>, fetch: SubmitFetch, apply: A)
    where
        G: Gateway,
        A: FnOnce(&mut S, &mut Dispatcher<S>, &SubmitFetch, Result<MutationResponse, GatewayError>)
            + Send
            + 'static,
    {
        let gw = Arc::clone(gateway);
        let (kind, command) = (fetch.kind, fetch.command.clone());
        self.spawn(
            async move { gw.mutate(kind, command).await },
            move |s, d, result| apply(s, d, &fetch, result),
        );
    }

    pub fn upload<G, A>(
        &mut self,
        gateway: &Arc<G>,
        kind: ResourceKind,
        id: EntityId,
        file: UploadFile,
        apply: A,
    ) where
        G: Gateway,
        A: FnOnce(&mut S, &mut Dispatcher<S>, Result<UploadResponse, GatewayError>)
            + Send
            + 'static,
    {
        let gw = Arc::clone(gateway);
        self.spawn(async move { gw.upload(kind, id, file).await }, apply);
    }
}

#[cfg(test)]
#[path = "../tests/browser/dispatcher_tests.rs"]
mod tests;
