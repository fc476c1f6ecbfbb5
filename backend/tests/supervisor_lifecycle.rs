use backend::{LaunchSpec, RunState, ServiceProfile, Supervisor, SupervisorError, SupervisorEvent};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn shell(dir: &std::path::Path, script: &str) -> Supervisor {
    Supervisor::new(
        LaunchSpec::new(dir, "sh", ["-c", script]),
        ServiceProfile::default(),
    )
}

/// Poll until a `Stopped` event shows up or the deadline passes.
fn drain_until_stopped(sup: &mut Supervisor) -> Vec<SupervisorEvent> {
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut events = Vec::new();
    while Instant::now() < deadline {
        let batch = sup.poll_events();
        let done = batch
            .iter()
            .any(|e| matches!(e, SupervisorEvent::Stopped { .. }));
        events.extend(batch);
        if done {
            break;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    events
}

#[test]
#[cfg(unix)]
fn full_loading_log_then_self_exit() {
    let dir = tempfile::tempdir().unwrap();
    let script = r#"
        echo "GPT weights restored"
        echo "semantic_codec weights restored" >&2
        echo "s2mel weights restored"
        echo "some unrelated noise"
        echo "campplus_model weights restored" >&2
        echo "bigvgan weights restored"
        echo "* Running on local URL:  http://0.0.0.0:7860"
    "#;
    let mut sup = shell(dir.path(), script);

    sup.start().unwrap();
    assert_eq!(sup.state(), RunState::Starting);

    let events = drain_until_stopped(&mut sup);
    assert_eq!(
        events,
        vec![
            SupervisorEvent::Status("1/5: GPT model loaded".into()),
            SupervisorEvent::Status("2/5: Semantic codec loaded".into()),
            SupervisorEvent::Status("3/5: S2Mel model loaded".into()),
            SupervisorEvent::Status("4/5: CAM++ model loaded".into()),
            SupervisorEvent::Status("5/5: BigVGAN vocoder loaded".into()),
            SupervisorEvent::Status("Service started successfully!".into()),
            SupervisorEvent::Ready {
                url: "http://0.0.0.0:7860".into(),
                browser_url: "http://127.0.0.1:7860".into(),
            },
            SupervisorEvent::Stopped { unexpected: true },
        ]
    );
    assert_eq!(sup.state(), RunState::Stopped);
    assert!(!sup.is_running());
    assert!(sup.url().is_none());
}

#[test]
#[cfg(unix)]
fn ready_line_moves_to_running() {
    let dir = tempfile::tempdir().unwrap();
    let mut sup = shell(
        dir.path(),
        "echo 'Running on local URL:  http://0.0.0.0:7860'; exec sleep 30",
    );
    sup.start().unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    while sup.state() != RunState::Running && Instant::now() < deadline {
        sup.poll_events();
        std::thread::sleep(Duration::from_millis(20));
    }
    assert_eq!(sup.state(), RunState::Running);
    assert_eq!(sup.url(), Some("http://0.0.0.0:7860"));

    sup.stop().unwrap();
    assert_eq!(sup.state(), RunState::Stopped);
    assert!(sup.url().is_none());
    assert_eq!(
        sup.poll_events(),
        vec![SupervisorEvent::Stopped { unexpected: false }]
    );
}

#[test]
#[cfg(unix)]
fn alternating_start_stop_ends_stopped() {
    let dir = tempfile::tempdir().unwrap();
    let mut sup = shell(dir.path(), "sleep 30 & sleep 30; wait");

    for _ in 0..3 {
        sup.start().unwrap();
        assert!(sup.is_running());
        assert!(sup.pid().is_some());
        sup.stop().unwrap();
        assert_eq!(sup.state(), RunState::Stopped);
        assert!(!sup.is_running());
    }
}

#[test]
#[cfg(unix)]
fn stop_kills_whole_group() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("survived");
    let script = format!("(sleep 1; touch '{}') & wait", marker.display());
    let mut sup = shell(dir.path(), &script);

    sup.start().unwrap();
    std::thread::sleep(Duration::from_millis(200));
    sup.stop().unwrap();

    std::thread::sleep(Duration::from_millis(1500));
    assert!(!marker.exists(), "background child outlived stop()");
}

#[test]
#[cfg(unix)]
fn stop_after_process_already_exited_still_stops() {
    let dir = tempfile::tempdir().unwrap();
    let mut sup = shell(dir.path(), "true");
    sup.start().unwrap();
    std::thread::sleep(Duration::from_millis(300));

    // The unreaped leader still holds the group, so the signal is delivered
    // and the leader reaped immediately.
    sup.stop().unwrap();
    assert_eq!(sup.state(), RunState::Stopped);
    assert!(!sup.is_running());

    // The reader's end-of-stream for the stopped run is discarded.
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(
        sup.poll_events(),
        vec![SupervisorEvent::Stopped { unexpected: false }]
    );
}

#[test]
#[cfg(unix)]
fn stale_end_of_stream_does_not_stop_next_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut sup = shell(dir.path(), "exec sleep 30");

    sup.start().unwrap();
    sup.stop().unwrap();
    sup.poll_events();

    sup.start().unwrap();
    for _ in 0..10 {
        let events = sup.poll_events();
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, SupervisorEvent::Stopped { .. })),
            "unexpected stop: {events:?}"
        );
        std::thread::sleep(Duration::from_millis(30));
    }
    assert_eq!(sup.state(), RunState::Starting);
    sup.stop().unwrap();
}

#[test]
#[cfg(unix)]
fn second_start_while_running_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut sup = shell(dir.path(), "exec sleep 30");

    sup.start().unwrap();
    let pid = sup.pid();
    assert!(matches!(sup.start(), Err(SupervisorError::AlreadyRunning)));
    assert_eq!(sup.pid(), pid);
    sup.stop().unwrap();
}

#[test]
#[cfg(unix)]
fn spawn_failure_is_synchronous_and_recoverable() {
    let dir = tempfile::tempdir().unwrap();
    let mut sup = Supervisor::new(
        LaunchSpec::new(dir.path(), "definitely-not-a-real-program-7860", Vec::<String>::new()),
        ServiceProfile::default(),
    );

    match sup.start() {
        Err(SupervisorError::SpawnError { program, .. }) => {
            assert_eq!(program, "definitely-not-a-real-program-7860")
        }
        other => panic!("expected SpawnError, got {other:?}"),
    }
    assert_eq!(sup.state(), RunState::Stopped);
    assert!(sup.poll_events().is_empty());
    assert!(sup.stop().is_ok());
}

#[test]
#[cfg(unix)]
fn waker_fires_for_worker_messages() {
    let dir = tempfile::tempdir().unwrap();
    let wakes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&wakes);
    let mut sup = shell(dir.path(), "echo 'GPT weights restored'")
        .with_waker(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

    sup.start().unwrap();
    let events = drain_until_stopped(&mut sup);

    assert!(events.contains(&SupervisorEvent::Stopped { unexpected: true }));
    // One milestone plus end-of-stream.
    assert_eq!(wakes.load(Ordering::SeqCst), 2);
}

#[test]
#[cfg(unix)]
fn virtual_env_is_activated_for_child() {
    let dir = tempfile::tempdir().unwrap();
    let mut spec = LaunchSpec::new(
        dir.path(),
        "sh",
        ["-c", "case \"$VIRTUAL_ENV\" in */venv_uv) echo 'GPT weights restored';; esac"],
    );
    spec.venv_dir = Some(dir.path().join("venv_uv"));
    let mut sup = Supervisor::new(spec, ServiceProfile::default());

    sup.start().unwrap();
    let events = drain_until_stopped(&mut sup);
    assert_eq!(events[0], SupervisorEvent::Status("1/5: GPT model loaded".into()));
}
