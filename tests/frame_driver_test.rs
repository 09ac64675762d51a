use room_viewer::frame::{DriverState, FrameDriver, FrameScheduler};

#[derive(Default)]
struct MockScheduler {
    requests: usize,
}

impl FrameScheduler for MockScheduler {
    fn request_frame(&mut self) {
        self.requests += 1;
    }
}

#[test]
fn idle_driver_does_not_run_frames() {
    let mut scheduler = MockScheduler::default();
    let mut driver = FrameDriver::new();
    let mut frames = 0;

    assert!(!driver.tick(&mut scheduler, |_| frames += 1));
    assert_eq!(frames, 0);
    assert_eq!(scheduler.requests, 0);
    assert_eq!(driver.state(), DriverState::Idle);
}

#[test]
fn running_driver_reschedules_every_tick() {
    let mut scheduler = MockScheduler::default();
    let mut driver = FrameDriver::new();
    driver.start(&mut scheduler);
    assert_eq!(driver.state(), DriverState::Running);
    assert_eq!(scheduler.requests, 1);

    let mut frames = 0;
    for tick in 1..=10 {
        assert!(driver.tick(&mut scheduler, |_| frames += 1));
        assert_eq!(scheduler.requests, tick + 1);
    }
    assert_eq!(frames, 10);
    assert_eq!(driver.frames(), 10);
}

#[test]
fn starting_twice_requests_one_frame() {
    let mut scheduler = MockScheduler::default();
    let mut driver = FrameDriver::new();
    driver.start(&mut scheduler);
    driver.start(&mut scheduler);
    assert_eq!(scheduler.requests, 1);
}

#[test]
fn cancellation_stops_the_loop_at_the_next_tick() {
    let mut scheduler = MockScheduler::default();
    let mut driver = FrameDriver::new();
    let token = driver.token();
    driver.start(&mut scheduler);
    driver.tick(&mut scheduler, |_| {});
    let requested = scheduler.requests;

    token.cancel();
    let mut frames = 0;
    assert!(!driver.tick(&mut scheduler, |_| frames += 1));
    assert_eq!(frames, 0);
    assert_eq!(scheduler.requests, requested);
    assert_eq!(driver.state(), DriverState::Stopped);

    // stopped is terminal
    driver.start(&mut scheduler);
    assert!(!driver.tick(&mut scheduler, |_| frames += 1));
    assert_eq!(driver.state(), DriverState::Stopped);
    assert_eq!(scheduler.requests, requested);
}

#[test]
fn stop_before_start_never_runs() {
    let mut scheduler = MockScheduler::default();
    let mut driver = FrameDriver::new();
    driver.stop();
    driver.start(&mut scheduler);
    assert_eq!(driver.state(), DriverState::Stopped);
    assert_eq!(scheduler.requests, 0);
}

#[test]
fn frame_time_is_monotonic() {
    let mut scheduler = MockScheduler::default();
    let mut driver = FrameDriver::new();
    driver.start(&mut scheduler);
    let mut times = Vec::new();
    for _ in 0..3 {
        driver.tick(&mut scheduler, |time| times.push(time));
    }
    assert!(times.windows(2).all(|w| w[0].elapsed <= w[1].elapsed));
}
