//! FFI bindings for Synheart Persona
//!
//! This module provides C-compatible functions for driving an analyzer from a
//! host runtime. Strings are null-terminated; strings returned to the caller
//! are heap allocated and must be freed with `persona_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::analyzer::{AnalysisReport, BehaviorAnalyzer};
use crate::config::AnalyzerConfig;
use crate::encoder::ReportEncoder;
use crate::replay::interactions_to_report;
use crate::sink::RecordingSink;
use crate::types::Viewport;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Replay a JSON array of interaction events and return the report JSON.
///
/// # Safety
/// - `events_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `persona_free_string`.
/// - Returns NULL on error; call `persona_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn persona_replay_events(events_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(events_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match interactions_to_report(&json_str) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Live Session API
// ============================================================================

/// Opaque handle to a live analyzer session
pub struct PersonaAnalyzerHandle {
    analyzer: BehaviorAnalyzer<RecordingSink>,
    analyses: Vec<AnalysisReport>,
    encoder: ReportEncoder,
}

/// Start an analyzer session with default configuration.
///
/// # Safety
/// - Returns a pointer to a newly allocated analyzer, to be freed with
///   `persona_analyzer_free`.
/// - Returns NULL when the analyzer cannot start (e.g. a non-positive
///   viewport); call `persona_last_error` for the reason.
#[no_mangle]
pub unsafe extern "C" fn persona_analyzer_new(
    viewport_width: f64,
    viewport_height: f64,
    session_start_ms: u64,
) -> *mut PersonaAnalyzerHandle {
    clear_last_error();

    let config = AnalyzerConfig::default();
    let sink = RecordingSink::new(config.heatmap_capacity);
    let viewport = Viewport::new(viewport_width, viewport_height);

    match BehaviorAnalyzer::new(sink, viewport, session_start_ms, config) {
        Ok(analyzer) => Box::into_raw(Box::new(PersonaAnalyzerHandle {
            analyzer,
            analyses: Vec::new(),
            encoder: ReportEncoder::new(),
        })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free an analyzer.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `persona_analyzer_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn persona_analyzer_free(handle: *mut PersonaAnalyzerHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Record a pointer move. Returns 1 if accepted, 0 if rate-gated, -1 on error.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `persona_analyzer_new`.
#[no_mangle]
pub unsafe extern "C" fn persona_record_pointer_move(
    handle: *mut PersonaAnalyzerHandle,
    x: f64,
    y: f64,
    now_ms: u64,
) -> i32 {
    clear_last_error();
    let Some(handle) = handle.as_mut() else {
        set_last_error("Null analyzer pointer");
        return -1;
    };
    i32::from(handle.analyzer.record_pointer_move(x, y, now_ms))
}

/// Record a click. A negative `pressure` means "not reported".
/// Returns 0 on success, -1 on error.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `persona_analyzer_new`.
#[no_mangle]
pub unsafe extern "C" fn persona_record_click(
    handle: *mut PersonaAnalyzerHandle,
    x: f64,
    y: f64,
    pressure: f64,
    now_ms: u64,
) -> i32 {
    clear_last_error();
    let Some(handle) = handle.as_mut() else {
        set_last_error("Null analyzer pointer");
        return -1;
    };
    let pressure = (pressure >= 0.0).then_some(pressure);
    handle.analyzer.record_click(x, y, pressure, now_ms);
    0
}

/// Record the current vertical scroll offset. Returns 0 on success, -1 on error.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `persona_analyzer_new`.
#[no_mangle]
pub unsafe extern "C" fn persona_record_scroll(
    handle: *mut PersonaAnalyzerHandle,
    vertical_offset: f64,
    now_ms: u64,
) -> i32 {
    clear_last_error();
    let Some(handle) = handle.as_mut() else {
        set_last_error("Null analyzer pointer");
        return -1;
    };
    handle.analyzer.record_scroll(vertical_offset, now_ms);
    0
}

/// Record a key press. Returns 0 on success, -1 on error.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `persona_analyzer_new`.
/// - `key` must be a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn persona_record_key_press(
    handle: *mut PersonaAnalyzerHandle,
    key: *const c_char,
    now_ms: u64,
) -> i32 {
    clear_last_error();
    let Some(handle) = handle.as_mut() else {
        set_last_error("Null analyzer pointer");
        return -1;
    };
    let Some(key) = cstr_to_string(key) else {
        set_last_error("Invalid key string pointer");
        return -1;
    };
    handle.analyzer.record_key_press(&key, now_ms);
    0
}

/// Update the viewport. Returns 0 on success, -1 on error.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `persona_analyzer_new`.
#[no_mangle]
pub unsafe extern "C" fn persona_set_viewport(
    handle: *mut PersonaAnalyzerHandle,
    width: f64,
    height: f64,
) -> i32 {
    clear_last_error();
    let Some(handle) = handle.as_mut() else {
        set_last_error("Null analyzer pointer");
        return -1;
    };
    handle.analyzer.set_viewport(Viewport::new(width, height));
    0
}

/// Run the session-time tick. Returns elapsed whole seconds, or -1 on error.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `persona_analyzer_new`.
#[no_mangle]
pub unsafe extern "C" fn persona_session_tick(
    handle: *mut PersonaAnalyzerHandle,
    now_ms: u64,
) -> i64 {
    clear_last_error();
    let Some(handle) = handle.as_mut() else {
        set_last_error("Null analyzer pointer");
        return -1;
    };
    i64::try_from(handle.analyzer.on_session_tick(now_ms)).unwrap_or(i64::MAX)
}

/// Run the analysis tick and return its report as JSON.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `persona_analyzer_new`.
/// - Returns a newly allocated string that must be freed with `persona_free_string`.
/// - Returns NULL on error; call `persona_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn persona_analysis_tick(
    handle: *mut PersonaAnalyzerHandle,
    now_ms: u64,
) -> *mut c_char {
    clear_last_error();
    let Some(handle) = handle.as_mut() else {
        set_last_error("Null analyzer pointer");
        return ptr::null_mut();
    };

    let report = handle.analyzer.on_analysis_tick(now_ms);
    let json = serde_json::to_string(&report);
    handle.analyses.push(report);

    match json {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Encode the full session report (history and display state) as JSON.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `persona_analyzer_new`.
/// - Returns a newly allocated string that must be freed with `persona_free_string`.
/// - Returns NULL on error; call `persona_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn persona_analyzer_report(
    handle: *const PersonaAnalyzerHandle,
) -> *mut c_char {
    clear_last_error();
    let Some(handle) = handle.as_ref() else {
        set_last_error("Null analyzer pointer");
        return ptr::null_mut();
    };

    match handle
        .encoder
        .encode_to_json(&handle.analyzer, &handle.analyses)
    {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Get the current display state (metric texts, traits, timeline, heatmap) as JSON.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `persona_analyzer_new`.
/// - Returns a newly allocated string that must be freed with `persona_free_string`.
/// - Returns NULL on error; call `persona_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn persona_display_state(
    handle: *const PersonaAnalyzerHandle,
) -> *mut c_char {
    clear_last_error();
    let Some(handle) = handle.as_ref() else {
        set_last_error("Null analyzer pointer");
        return ptr::null_mut();
    };

    match serde_json::to_string(&handle.analyzer.sink().display_state()) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Persona functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Persona function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn persona_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Persona function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn persona_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the Persona library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn persona_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
