use std::cell::{Cell, RefCell};
use std::ffi::c_void;
use std::rc::Rc;

use antilag2::{
    AntiLagContext, AntiLagController, AntiLagDriver, AntiLagError, ControllerState, DeviceHandle,
    DriverResult,
};

/// Driver calls observed by the test, shared with the driver the controller owns
#[derive(Default)]
struct Calls {
    initialize: Cell<u32>,
    update: Cell<u32>,
    deinitialize: Cell<u32>,
    next_update: RefCell<Vec<DriverResult>>,
}

impl Calls {
    fn total(&self) -> u32 {
        self.initialize.get() + self.update.get() + self.deinitialize.get()
    }
}

struct MockDriver {
    calls: Rc<Calls>,
    init_result: DriverResult,
}

impl MockDriver {
    fn new(init_result: DriverResult) -> (Self, Rc<Calls>) {
        let calls = Rc::new(Calls::default());
        let driver = Self {
            calls: Rc::clone(&calls),
            init_result,
        };
        (driver, calls)
    }
}

impl AntiLagDriver for MockDriver {
    fn initialize(&mut self, _context: &mut AntiLagContext, _device: DeviceHandle) -> DriverResult {
        self.calls.initialize.set(self.calls.initialize.get() + 1);
        self.init_result
    }

    fn update(&mut self, _context: &mut AntiLagContext, _enable: bool, _max_fps: u32) -> DriverResult {
        self.calls.update.set(self.calls.update.get() + 1);
        let mut queued = self.calls.next_update.borrow_mut();
        if queued.is_empty() {
            DriverResult::Ok
        } else {
            queued.remove(0)
        }
    }

    fn deinitialize(&mut self, _context: &mut AntiLagContext) -> DriverResult {
        self.calls.deinitialize.set(self.calls.deinitialize.get() + 1);
        DriverResult::Ok
    }
}

fn valid_device() -> DeviceHandle {
    // The mock never dereferences the device
    unsafe { DeviceHandle::from_raw(0xD3D1_1000usize as *mut c_void) }
}

#[test]
fn test_scenario_full_lifecycle() {
    let (driver, calls) = MockDriver::new(DriverResult::Ok);
    let mut controller = AntiLagController::new(driver);

    assert_eq!(controller.initialize(valid_device()), Ok(()));
    assert_eq!(controller.update(true, 144), Ok(()));
    assert_eq!(controller.update(false, 0), Ok(()));
    assert_eq!(controller.shutdown(), Ok(()));

    assert_eq!(controller.state(), ControllerState::ShutDown);
    assert_eq!(calls.update.get(), 2);
    assert_eq!(calls.deinitialize.get(), 1);
}

#[test]
fn test_scenario_unsupported_is_inert() {
    let (driver, calls) = MockDriver::new(DriverResult::Unsupported);
    let mut controller = AntiLagController::new(driver);

    assert_eq!(
        controller.initialize(valid_device()),
        Err(AntiLagError::Unsupported)
    );
    let after_init = calls.total();

    assert_eq!(controller.update(true, 60), Ok(()));
    assert_eq!(controller.shutdown(), Ok(()));

    assert_eq!(calls.total(), after_init);
    assert!(controller.context().is_zeroed());
}

#[test]
fn test_scenario_update_failure_stops_driver_calls() {
    let (driver, calls) = MockDriver::new(DriverResult::Ok);
    let mut controller = AntiLagController::new(driver);

    assert_eq!(controller.initialize(valid_device()), Ok(()));
    calls.next_update.borrow_mut().push(DriverResult::Fail);

    assert_eq!(controller.update(true, 60), Err(AntiLagError::Fail));
    assert_eq!(controller.state(), ControllerState::Failed);

    let after_failure = calls.total();
    assert_eq!(controller.update(true, 60), Ok(()));
    assert_eq!(controller.update(false, 0), Ok(()));
    assert_eq!(controller.shutdown(), Ok(()));
    assert_eq!(calls.total(), after_failure);
}

#[test]
fn test_failed_initialize_never_resurrects() {
    for code in [DriverResult::Fail, DriverResult::InvalidArgument] {
        let (driver, calls) = MockDriver::new(code);
        let mut controller = AntiLagController::new(driver);

        assert!(controller.initialize(valid_device()).is_err());
        assert_eq!(controller.state(), ControllerState::Failed);

        assert_eq!(
            controller.initialize(valid_device()),
            Err(AntiLagError::InvalidArgument)
        );
        assert_eq!(controller.update(true, 60), Ok(()));
        assert_eq!(controller.state(), ControllerState::Failed);
        assert_eq!(calls.total(), 1);
    }
}

#[test]
fn test_update_outside_initialized_makes_no_driver_call() {
    let (driver, calls) = MockDriver::new(DriverResult::Ok);
    let mut controller = AntiLagController::new(driver);

    assert_eq!(
        controller.update(true, 60),
        Err(AntiLagError::NotInitialized)
    );

    controller.shutdown().unwrap();
    assert_eq!(controller.update(true, 60), Ok(()));
    assert_eq!(calls.total(), 0);
}

#[test]
fn test_shutdown_repeated_matches_single() {
    for repeats in 1..=4 {
        let (driver, calls) = MockDriver::new(DriverResult::Ok);
        let mut controller = AntiLagController::new(driver);
        controller.initialize(valid_device()).unwrap();

        for _ in 0..repeats {
            assert_eq!(controller.shutdown(), Ok(()));
        }

        assert_eq!(controller.state(), ControllerState::ShutDown);
        assert!(controller.context().is_zeroed());
        assert_eq!(calls.deinitialize.get(), 1);
    }
}

#[test]
fn test_drop_releases_live_context() {
    let (driver, calls) = MockDriver::new(DriverResult::Ok);
    {
        let mut controller = AntiLagController::new(driver);
        controller.initialize(valid_device()).unwrap();
        controller.update(true, 0).unwrap();
    }
    assert_eq!(calls.deinitialize.get(), 1);

    let (driver, calls) = MockDriver::new(DriverResult::Ok);
    {
        let mut controller = AntiLagController::new(driver);
        controller.initialize(valid_device()).unwrap();
        controller.shutdown().unwrap();
    }
    assert_eq!(calls.deinitialize.get(), 1);
}
