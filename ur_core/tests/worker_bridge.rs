#[cfg(test)]
mod tests {
    use std::sync::mpsc::{self, Receiver};
    use std::time::Duration;
    use ur_core::logic::board::{Board, Player};
    use ur_core::logic::game::GameState;
    use ur_core::protocol::ai::AiFunctionality;
    use ur_core::worker::{
        BridgeError, ComputerWorker, EngineError, SecondaryEngine, SecondaryEngineLoader,
        ThreadWorker, WorkerEvent,
    };

    const TIMEOUT: Duration = Duration::from_secs(10);

    struct EchoStartEngine;

    impl SecondaryEngine for EchoStartEngine {
        fn send_request(&mut self, _request: &str) -> Result<String, EngineError> {
            Ok("24".to_owned())
        }
    }

    struct EchoStartLoader;

    impl SecondaryEngineLoader for EchoStartLoader {
        type Engine = EchoStartEngine;

        fn load(self) -> Result<EchoStartEngine, EngineError> {
            Ok(EchoStartEngine)
        }
    }

    struct BrokenEngine;

    impl SecondaryEngine for BrokenEngine {
        fn send_request(&mut self, _request: &str) -> Result<String, EngineError> {
            Err(EngineError::Request("no answer".to_owned()))
        }
    }

    struct BrokenLoader;

    impl SecondaryEngineLoader for BrokenLoader {
        type Engine = BrokenEngine;

        fn load(self) -> Result<BrokenEngine, EngineError> {
            Ok(BrokenEngine)
        }
    }

    fn connect<L>(loader: L) -> (ComputerWorker<ThreadWorker>, Receiver<String>)
    where
        L: SecondaryEngineLoader + Send + 'static,
        L::Engine: Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let host = ThreadWorker::spawn(loader, move |packet| {
            let _ = tx.send(packet);
        });
        (ComputerWorker::new(host), rx)
    }

    fn next_event(
        worker: &mut ComputerWorker<ThreadWorker>,
        rx: &Receiver<String>,
    ) -> Option<WorkerEvent> {
        let raw = rx.recv_timeout(TIMEOUT).unwrap();
        worker.on_message(&raw).unwrap()
    }

    #[test]
    fn test_local_search_round_trip() {
        let (mut worker, rx) = connect(ur_core::worker::NoSecondaryEngine);
        next_event(&mut worker, &rx);
        assert_eq!(
            next_event(&mut worker, &rx),
            Some(WorkerEvent::FunctionalityChanged(AiFunctionality {
                available: true,
                panda_available: false,
                panda_unsupported: true,
            }))
        );

        worker
            .post_move_request(&GameState::new(), 1, 3, false)
            .unwrap();
        assert_eq!(
            next_event(&mut worker, &rx),
            Some(WorkerEvent::MoveComputed(Board::start(Player::Light)))
        );
        assert!(!worker.is_waiting());
    }

    #[test]
    fn test_panda_round_trip() {
        let (mut worker, rx) = connect(EchoStartLoader);
        next_event(&mut worker, &rx);
        next_event(&mut worker, &rx);
        assert!(worker.functionality().panda_available);

        worker
            .post_move_request(&GameState::new(), 4, 7, true)
            .unwrap();
        assert_eq!(
            next_event(&mut worker, &rx),
            Some(WorkerEvent::MoveComputed(Board::start(Player::Light)))
        );
    }

    #[test]
    fn test_discarded_request_is_swallowed() {
        let (mut worker, rx) = connect(ur_core::worker::NoSecondaryEngine);
        next_event(&mut worker, &rx);
        next_event(&mut worker, &rx);

        let state = GameState::new();
        worker.post_move_request(&state, 2, 2, false).unwrap();
        worker.discard_pending();
        worker.post_move_request(&state, 1, 2, false).unwrap();

        assert_eq!(next_event(&mut worker, &rx), None);
        assert_eq!(
            next_event(&mut worker, &rx),
            Some(WorkerEvent::MoveComputed(Board::start(Player::Light)))
        );
    }

    #[test]
    fn test_out_of_range_request_leaves_bridge_usable() {
        let (mut worker, rx) = connect(ur_core::worker::NoSecondaryEngine);
        next_event(&mut worker, &rx);
        next_event(&mut worker, &rx);

        let state = GameState::new();
        assert_eq!(
            worker.post_move_request(&state, 5, 2, false),
            Err(BridgeError::InvalidRequest { depth: 2, roll: 5 })
        );
        assert!(!worker.is_waiting());
        worker.discard_pending();

        worker.post_move_request(&state, 1, 2, false).unwrap();
        assert_eq!(
            next_event(&mut worker, &rx),
            Some(WorkerEvent::MoveComputed(Board::start(Player::Light)))
        );
        assert!(!worker.is_waiting());
    }

    #[test]
    fn test_failing_panda_still_answers() {
        let (mut worker, rx) = connect(BrokenLoader);
        next_event(&mut worker, &rx);
        next_event(&mut worker, &rx);
        assert!(worker.functionality().panda_available);

        worker
            .post_move_request(&GameState::new(), 2, 7, true)
            .unwrap();
        assert_eq!(
            next_event(&mut worker, &rx),
            Some(WorkerEvent::MoveComputed(Board::start(Player::Light)))
        );
        assert!(!worker.is_waiting());
    }
}
