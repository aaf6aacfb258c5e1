//! Browser host: an [`AiWorker`] behind a `gloo-worker` web worker.

use crate::worker::{AiWorker, BridgeError, EngineError, SecondaryEngineLoader, WorkerTransport};
use gloo_worker::{HandlerId, Spawnable, Worker, WorkerBridge, WorkerScope};
use std::collections::HashSet;

pub struct WebAiWorker<L: SecondaryEngineLoader> {
    core: AiWorker<L::Engine>,
    bridges: HashSet<HandlerId>,
}

impl<L> WebAiWorker<L>
where
    L: SecondaryEngineLoader + Default + 'static,
    L::Engine: 'static,
{
    fn announce(&self, scope: &WorkerScope<Self>, packet: &str) {
        for id in &self.bridges {
            scope.respond(*id, packet.to_owned());
        }
    }
}

impl<L> Worker for WebAiWorker<L>
where
    L: SecondaryEngineLoader + Default + 'static,
    L::Engine: 'static,
{
    type Input = String;
    type Message = Result<L::Engine, EngineError>;
    type Output = String;

    fn create(scope: &WorkerScope<Self>) -> Self {
        scope.send_future(async { L::default().load() });
        Self {
            core: AiWorker::new(),
            bridges: HashSet::new(),
        }
    }

    fn update(&mut self, scope: &WorkerScope<Self>, msg: Self::Message) {
        match self.core.on_panda_loaded(msg) {
            Ok(packet) => self.announce(scope, &packet),
            Err(err) => log::error!("failed to announce worker functionality: {err}"),
        }
    }

    fn connected(&mut self, scope: &WorkerScope<Self>, id: HandlerId) {
        self.bridges.insert(id);
        match self.core.functionality_packet() {
            Ok(packet) => scope.respond(id, packet),
            Err(err) => log::error!("failed to announce worker functionality: {err}"),
        }
    }

    fn disconnected(&mut self, _scope: &WorkerScope<Self>, id: HandlerId) {
        self.bridges.remove(&id);
    }

    fn received(&mut self, scope: &WorkerScope<Self>, msg: Self::Input, id: HandlerId) {
        match self.core.on_message(&msg) {
            Ok(reply) => scope.respond(id, reply),
            Err(err) => log::error!("worker rejected a message: {err}"),
        }
    }
}

/// Spawns the worker script at `path`; `on_output` receives every packet it sends.
pub fn spawn<L, F>(path: &str, on_output: F) -> WorkerBridge<WebAiWorker<L>>
where
    L: SecondaryEngineLoader + Default + 'static,
    L::Engine: 'static,
    F: Fn(String) + 'static,
{
    WebAiWorker::<L>::spawner().callback(on_output).spawn(path)
}

impl<L> WorkerTransport for WorkerBridge<WebAiWorker<L>>
where
    L: SecondaryEngineLoader + Default + 'static,
    L::Engine: 'static,
{
    fn post(&self, message: String) -> Result<(), BridgeError> {
        self.send(message);
        Ok(())
    }
}
