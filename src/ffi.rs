// C-compatible FFI bindings for native plugin hosts and Swift/iOS.
//
// Safety requirements:
// - All pointers must be non-null unless documented otherwise
// - All handles must be created by this module and not fabricated
// - Caller must call the corresponding _destroy function for each _create
// - An engine handle belongs to the audio thread; control handles may be
//   used from any other thread

use crate::audio_buffer::AudioBuffer;
use crate::bridge::{ControlHandle, EngineHandle, EngineReadback, create_bridge};
use crate::engine::PitchShifter;
use crate::params::param_infos;

use log::error;

// Logger subsystem identifier
#[cfg(feature = "ios")]
const LOG_SUBSYSTEM: &str = "com.phasorshift.engine";

// ═══════════════════════════════════════════════════════════════════════════
// Logger Initialization
// ═══════════════════════════════════════════════════════════════════════════

/// Initialize the oslog logger.
///
/// Call once at application startup before using any other FFI function.
#[cfg(feature = "ios")]
#[unsafe(no_mangle)]
pub extern "C" fn phasorshift_init_logger() {
    use log::LevelFilter;
    use oslog::OsLogger;

    OsLogger::new(LOG_SUBSYSTEM)
        .level_filter(LevelFilter::Debug)
        .init()
        .ok();
}

// ═══════════════════════════════════════════════════════════════════════════
// Opaque Handle Types
// ═══════════════════════════════════════════════════════════════════════════

/// Opaque handle to the audio-side engine.
pub struct PhasorShiftEngine {
    inner: EngineHandle,
    control: ControlHandle,

    /// Planar staging buffer for host blocks longer than the prepared size
    scratch: Vec<f32>,
}

/// Opaque handle to the control side.
pub struct PhasorShiftControl {
    inner: ControlHandle,
}

// ═══════════════════════════════════════════════════════════════════════════
// FFI Result Types
// ═══════════════════════════════════════════════════════════════════════════

/// Readback data from the engine (for meters/displays).
#[repr(C)]
pub struct PhasorShiftReadback {
    pub sample_position: u64,
    pub output_peak: f32,
    pub prepared: bool,
}

impl From<EngineReadback> for PhasorShiftReadback {
    fn from(r: EngineReadback) -> Self {
        Self {
            sample_position: r.sample_position,
            output_peak: r.output_peak,
            prepared: r.prepared,
        }
    }
}

/// Parameter info for host controls.
#[repr(C)]
pub struct PhasorShiftParamInfo {
    pub id: u32,
    pub min_value: f32,
    pub max_value: f32,
    pub default_value: f32,
    /// 0 = none, 1 = ms, 2 = semitones
    pub unit: u32,
}

// ═══════════════════════════════════════════════════════════════════════════
// Engine
// ═══════════════════════════════════════════════════════════════════════════

/// Create an engine for `channels` audio channels.
///
/// The engine must be prepared before it produces sound. Returns NULL if
/// `channels` is zero.
#[unsafe(no_mangle)]
pub extern "C" fn phasorshift_engine_create(channels: u32) -> *mut PhasorShiftEngine {
    if channels == 0 {
        error!("phasorshift_engine_create: channel count must be non-zero");
        return std::ptr::null_mut();
    }

    let (control, inner) = create_bridge(PitchShifter::new(channels as usize));
    Box::into_raw(Box::new(PhasorShiftEngine {
        inner,
        control,
        scratch: Vec::new(),
    }))
}

/// Destroy an engine.
///
/// # Safety
/// `engine` must be a valid pointer returned by `phasorshift_engine_create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn phasorshift_engine_destroy(engine: *mut PhasorShiftEngine) {
    if !engine.is_null() {
        unsafe { drop(Box::from_raw(engine)) };
    }
}

/// Prepare for playback. Resets all audio state.
///
/// Returns `false` if the handle is null or the configuration is invalid.
///
/// # Safety
/// `engine` must be valid and not currently processing.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn phasorshift_engine_prepare(
    engine: *mut PhasorShiftEngine,
    sample_rate: f64,
    block_size: u32,
) -> bool {
    if engine.is_null() {
        error!("phasorshift_engine_prepare: null engine");
        return false;
    }
    let wrapper = unsafe { &mut *engine };

    match wrapper.inner.prepare(sample_rate, block_size as usize) {
        Ok(()) => {
            let channels = wrapper.inner.engine().channels();
            wrapper.scratch = vec![0.0; channels * block_size as usize];
            true
        }
        Err(e) => {
            error!("phasorshift_engine_prepare: {}", e);
            false
        }
    }
}

/// Process one host block in place.
///
/// `data` is planar: `channels` runs of `frames` samples. Blocks longer
/// than the prepared block size are processed in prepared-size pieces.
///
/// # Safety
/// - Must be called from the audio thread
/// - `data` must point to `channels * frames` valid floats
#[unsafe(no_mangle)]
pub unsafe extern "C" fn phasorshift_engine_process(
    engine: *mut PhasorShiftEngine,
    data: *mut f32,
    channels: u32,
    frames: u32,
) {
    if data.is_null() {
        return;
    }
    let channels = channels as usize;
    let frames = frames as usize;
    let samples = unsafe { std::slice::from_raw_parts_mut(data, channels * frames) };

    if engine.is_null() {
        samples.fill(0.0);
        return;
    }
    let wrapper = unsafe { &mut *engine };

    let mut buffer = AudioBuffer::new(samples, channels);
    wrapper
        .inner
        .process_split(&mut buffer, &mut wrapper.scratch);
}

/// Create a control handle bound to `engine`.
///
/// The control handle stays valid after the engine is destroyed (its
/// writes are then ignored) and must be freed with
/// `phasorshift_control_destroy`.
///
/// # Safety
/// `engine` must be a valid engine pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn phasorshift_engine_control(
    engine: *const PhasorShiftEngine,
) -> *mut PhasorShiftControl {
    if engine.is_null() {
        return std::ptr::null_mut();
    }
    let control = unsafe { (*engine).control.clone() };
    Box::into_raw(Box::new(PhasorShiftControl { inner: control }))
}

// ═══════════════════════════════════════════════════════════════════════════
// Control
// ═══════════════════════════════════════════════════════════════════════════

/// Destroy a control handle.
///
/// # Safety
/// `control` must be a valid pointer returned by `phasorshift_engine_control`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn phasorshift_control_destroy(control: *mut PhasorShiftControl) {
    if !control.is_null() {
        unsafe { drop(Box::from_raw(control)) };
    }
}

/// Set a voice's transposition in semitones (-12 to 12).
///
/// # Safety
/// `control` must be valid or NULL.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn phasorshift_control_set_transposition(
    control: *const PhasorShiftControl,
    voice: u32,
    semitones: f32,
) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.set_voice_transposition(voice as usize, semitones) }
}

/// Set the window size in milliseconds (5 to 300).
///
/// # Safety
/// `control` must be valid or NULL.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn phasorshift_control_set_window_size(
    control: *const PhasorShiftControl,
    ms: f32,
) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.set_window_size_ms(ms) }
}

/// Set any parameter by id.
///
/// # Safety
/// `control` must be valid or NULL.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn phasorshift_control_set_param(
    control: *const PhasorShiftControl,
    param_id: u32,
    value: f32,
) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.set_param(param_id, value) }
}

/// Apply a harmony preset (1 = minor 3rd, 2 = major 3rd, 3 = major 7th,
/// 4 = perfect fifth).
///
/// # Safety
/// `control` must be valid or NULL.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn phasorshift_control_apply_preset(
    control: *const PhasorShiftControl,
    preset_id: u32,
) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.apply_preset_id(preset_id) }
}

/// Read engine state for meters.
///
/// # Safety
/// `control` must be valid or NULL.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn phasorshift_control_readback(
    control: *const PhasorShiftControl,
) -> PhasorShiftReadback {
    if control.is_null() {
        return EngineReadback::default().into();
    }
    unsafe { (*control).inner.readback().into() }
}

// ═══════════════════════════════════════════════════════════════════════════
// Parameter Metadata
// ═══════════════════════════════════════════════════════════════════════════

/// Number of parameters.
#[unsafe(no_mangle)]
pub extern "C" fn phasorshift_param_count() -> u32 {
    param_infos().len() as u32
}

/// Metadata for the parameter at `index`.
///
/// Returns `false` and leaves `out` untouched if `index` is out of range.
///
/// # Safety
/// `out` must be a valid pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn phasorshift_param_info(index: u32, out: *mut PhasorShiftParamInfo) -> bool {
    if out.is_null() {
        return false;
    }
    let Some(info) = param_infos().into_iter().nth(index as usize) else {
        return false;
    };
    unsafe {
        *out = PhasorShiftParamInfo {
            id: info.id,
            min_value: info.min,
            max_value: info.max,
            default_value: info.default,
            unit: info.unit.code(),
        };
    }
    true
}
