//! Recording doubles for the native APIs
//!
//! Every backend's API trait is implemented for [`MockApi`] in that
//! backend's test module. Calls go into a shared [`CallLog`]; the call
//! named by `fail_at` returns its failure sentinel.

use glprobe_core::{ApiProvider, GlString, GlStrings, ProbeContext, ProbeError};
use glprobe_loader::LoadError;
use std::cell::RefCell;
use std::ffi::c_void;
use std::ptr::NonNull;
use std::rc::Rc;

pub struct CallLog {
    label: &'static str,
    fail_at: Option<&'static str>,
    calls: RefCell<Vec<&'static str>>,
}

impl CallLog {
    pub fn new(label: &'static str, fail_at: Option<&'static str>) -> Rc<Self> {
        Rc::new(Self {
            label,
            fail_at,
            calls: RefCell::new(Vec::new()),
        })
    }

    /// Record an acquisition call; `false` when it is the injected failure.
    pub fn call(&self, name: &'static str) -> bool {
        self.calls.borrow_mut().push(name);
        self.fail_at != Some(name)
    }

    pub fn record(&self, name: &'static str) {
        self.calls.borrow_mut().push(name);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }
}

pub fn dangling() -> NonNull<c_void> {
    NonNull::dangling()
}

pub struct MockProvider {
    pub log: Rc<CallLog>,
}

impl MockProvider {
    pub fn new(log: &Rc<CallLog>) -> Self {
        Self { log: Rc::clone(log) }
    }
}

impl ApiProvider for MockProvider {
    type Api = MockApi;

    fn open(&self, _ctx: &ProbeContext) -> Result<MockApi, ProbeError> {
        if self.log.call("open") {
            Ok(MockApi { log: Rc::clone(&self.log) })
        } else {
            Err(LoadError::Open {
                tried: vec![format!("lib{}-mock.so", self.log.label)],
            }
            .into())
        }
    }
}

/// An opened mock library. Dropping it logs `unload`.
pub struct MockApi {
    pub log: Rc<CallLog>,
}

impl MockApi {
    pub fn strings(&self) -> MockStrings {
        MockStrings::new(&self.log)
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.log.record("unload");
    }
}

pub struct MockStrings {
    log: Rc<CallLog>,
}

impl MockStrings {
    pub fn new(log: &Rc<CallLog>) -> Self {
        Self { log: Rc::clone(log) }
    }
}

impl GlStrings for MockStrings {
    fn get_string(&self, name: GlString) -> Option<String> {
        self.log
            .call(name.call())
            .then(|| format!("{} {:?}", self.log.label, name))
    }
}

/// One acquisition step and the call that releases it, if any.
pub type Step = (&'static str, Option<&'static str>);

/// The exact call sequence for a chain failing at `steps[fail]`, or
/// succeeding when `fail` is `None`.
pub fn expected_calls(steps: &[Step], fail: Option<usize>) -> Vec<&'static str> {
    let reached = fail.map_or(steps.len(), |index| index + 1);
    let acquired = fail.unwrap_or(steps.len());

    let mut calls: Vec<&'static str> = steps[..reached].iter().map(|(call, _)| *call).collect();
    calls.extend(steps[..acquired].iter().rev().filter_map(|(_, release)| *release));
    calls
}

/// Inject a failure at every step in turn and check that exactly the
/// earlier steps were released, newest first.
pub fn assert_every_failure_point<F>(steps: &[Step], mut run: F)
where
    F: FnMut(&Rc<CallLog>) -> glprobe_core::ProbeOutcome,
{
    for (index, &(call, _)) in steps.iter().enumerate() {
        let log = CallLog::new("mock", Some(call));
        let outcome = run(&log);

        assert!(outcome.is_err(), "chain succeeded despite failing {call}");
        assert_eq!(log.calls(), expected_calls(steps, Some(index)), "failure injected at {call}");
    }

    let log = CallLog::new("mock", None);
    assert!(run(&log).is_ok());
    assert_eq!(log.calls(), expected_calls(steps, None));
}

#[test]
fn test_expected_calls_releases_acquired_steps_in_reverse() {
    let steps: &[Step] = &[("open", Some("unload")), ("a", None), ("b", Some("free b")), ("c", Some("free c"))];

    assert_eq!(expected_calls(steps, Some(0)), vec!["open"]);
    assert_eq!(expected_calls(steps, Some(3)), vec!["open", "a", "b", "c", "free b", "unload"]);
    assert_eq!(
        expected_calls(steps, None),
        vec!["open", "a", "b", "c", "free c", "free b", "unload"]
    );
}
