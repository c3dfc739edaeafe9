//! Real controller backend via the vendor shared object
//!
//! This module loads the proprietary accelerator control library at
//! runtime and forwards each [`GraphController`] method to the matching C
//! symbol. All unsafe FFI is confined here; the rest of the crate only
//! sees the trait.
//!
//! Descriptor blocks cross the boundary as `#[repr(C)]` twins of the
//! public descriptor types, laid out the way the vendor headers declare
//! them. The input node buffer is staged host-side and pushed through the
//! fill symbol right before execution.

use std::ffi::CString;
use std::os::raw::c_char;
use std::path::Path;

use libloading::{Library, Symbol};

use super::{ControllerStats, GraphController};
use crate::config::ControllerConfig;
use crate::error::{Result, SocGraphError};
use crate::types::{FloatNodeData, GraphId, InputDescriptor, NodeShape, OutputDescriptor};

/// Status code reported when a vendor symbol cannot be resolved
const SYMBOL_ERROR: i32 = i32::MIN;

#[repr(C)]
struct RawInput {
    src_id: i32,
    output_idx: i32,
}

#[repr(C)]
struct RawOutput {
    max_size: u32,
}

type VersionFn = unsafe extern "C" fn() -> i32;
type InitFn = unsafe extern "C" fn(i32, i32, i32) -> i32;
type GrowMemoryFn = unsafe extern "C" fn() -> i32;
type DeinitFn = unsafe extern "C" fn();
type SetupGraphFn = unsafe extern "C" fn(i32) -> u32;
type InstantiateGraphFn = unsafe extern "C" fn() -> u32;
type GraphOpFn = unsafe extern "C" fn(u32) -> i32;
type AppendConstNodeFn = unsafe extern "C" fn(
    *const c_char, // name
    u32,           // graph
    i32,           // node id
    i32,           // batch
    i32,           // height
    i32,           // width
    i32,           // depth
    *const u8,     // data
    i32,           // data length
) -> i32;
type AppendNodeFn = unsafe extern "C" fn(
    *const c_char,    // name
    u32,              // graph
    i32,              // node id
    i32,              // op id
    i32,              // padding id
    *const RawInput,  // inputs
    i32,              // input count
    *const RawOutput, // outputs
    i32,              // output count
) -> i32;
type FillInputFloatFn = unsafe extern "C" fn(i32, i32, i32, i32, *const u8, u64) -> i32;
type ReadOutputFloatFn = unsafe extern "C" fn(*const c_char, *mut i32) -> *const f32;
type InputCapacityFn = unsafe extern "C" fn() -> i32;
type EnableDummyInputFn = unsafe extern "C" fn(u8);
type LoadDummyInputFn = unsafe extern "C" fn(i32) -> i32;
type SetLogLevelFn = unsafe extern "C" fn(i32);

/// Controller backend forwarding to the vendor shared object
pub struct SharedLibController {
    lib: Library,
    input_buffer: FloatNodeData,
    dummy_input: bool,
    stats: ControllerStats,
}

impl SharedLibController {
    /// Load the vendor controller library from `path`
    ///
    /// # Safety
    ///
    /// Loading a shared object runs its initialization code; the caller
    /// must ensure the path names the genuine vendor library.
    pub unsafe fn load(path: impl AsRef<Path>) -> Result<Self> {
        let lib = Library::new(path.as_ref())?;
        let capacity = {
            let f: Symbol<InputCapacityFn> = lib.get(b"soc_controller_input_buffer_capacity\0")?;
            f()
        };
        if capacity < 0 {
            return Err(SocGraphError::Controller {
                op: "input_buffer_capacity",
                code: capacity,
            });
        }
        tracing::info!(
            path = %path.as_ref().display(),
            capacity,
            "vendor controller library loaded"
        );
        Ok(Self {
            lib,
            input_buffer: FloatNodeData::with_capacity(capacity as usize),
            dummy_input: false,
            stats: ControllerStats::default(),
        })
    }

    fn call_i32(&self, name: &'static str, symbol: &[u8]) -> i32 {
        let f: Symbol<VersionFn> = match unsafe { self.lib.get(symbol) } {
            Ok(f) => f,
            Err(e) => {
                tracing::error!(op = name, error = %e, "vendor symbol missing");
                return SYMBOL_ERROR;
            }
        };
        unsafe { f() }
    }

    fn graph_op(&mut self, name: &'static str, symbol: &[u8], graph: GraphId) -> i32 {
        let f: Symbol<GraphOpFn> = match unsafe { self.lib.get(symbol) } {
            Ok(f) => f,
            Err(e) => {
                tracing::error!(op = name, error = %e, "vendor symbol missing");
                self.stats.record_call(true);
                return SYMBOL_ERROR;
            }
        };
        let code = unsafe { f(graph.raw()) };
        self.stats.record_call(code != 0);
        code
    }

    /// Push the staged input tensor through the vendor fill symbol
    fn flush_input_buffer(&mut self) -> i32 {
        let f: Symbol<FillInputFloatFn> =
            match unsafe { self.lib.get(b"soc_controller_fill_input_node_float\0") } {
                Ok(f) => f,
                Err(e) => {
                    tracing::error!(error = %e, "vendor symbol missing");
                    return SYMBOL_ERROR;
                }
            };
        let dims = self.input_buffer.dims();
        let bytes = self.input_buffer.bytes();
        unsafe {
            f(
                dims.x as i32,
                dims.y as i32,
                dims.z as i32,
                dims.d as i32,
                bytes.as_ptr(),
                bytes.len() as u64,
            )
        }
    }
}

impl GraphController for SharedLibController {
    fn wrapper_version(&self) -> i32 {
        self.call_i32("wrapper_version", b"soc_controller_get_wrapper_version\0")
    }

    fn binary_version(&self) -> i32 {
        self.call_i32("binary_version", b"soc_controller_get_binary_version\0")
    }

    fn init(&mut self, config: &ControllerConfig) -> Result<()> {
        let f: Symbol<InitFn> =
            unsafe { self.lib.get(b"soc_controller_init_with_attributes\0") }?;
        let code = unsafe { f(config.enable_dcvs, config.bus_usage, config.graph_version) };
        self.stats.record_call(code != 0);
        if code != 0 {
            return Err(SocGraphError::Controller { op: "init", code });
        }
        Ok(())
    }

    fn grow_memory(&mut self) -> Result<()> {
        let f: Symbol<GrowMemoryFn> = unsafe { self.lib.get(b"soc_controller_grow_memory\0") }?;
        let code = unsafe { f() };
        self.stats.record_call(code != 0);
        if code != 0 {
            return Err(SocGraphError::Controller {
                op: "grow_memory",
                code,
            });
        }
        Ok(())
    }

    fn deinit(&mut self) {
        if let Ok(f) = unsafe { self.lib.get::<DeinitFn>(b"soc_controller_deinit\0") } {
            unsafe { f() };
            self.stats.record_call(false);
        }
    }

    fn setup_graph(&mut self, version: i32) -> u32 {
        let f: Symbol<SetupGraphFn> = match unsafe { self.lib.get(b"soc_controller_setup_graph\0") }
        {
            Ok(f) => f,
            Err(e) => {
                tracing::error!(error = %e, "vendor symbol missing");
                self.stats.record_call(true);
                return 0;
            }
        };
        let id = unsafe { f(version) };
        self.stats.record_call(id == 0);
        id
    }

    fn instantiate_graph(&mut self) -> u32 {
        let f: Symbol<InstantiateGraphFn> =
            match unsafe { self.lib.get(b"soc_controller_instantiate_graph\0") } {
                Ok(f) => f,
                Err(e) => {
                    tracing::error!(error = %e, "vendor symbol missing");
                    self.stats.record_call(true);
                    return 0;
                }
            };
        let id = unsafe { f() };
        self.stats.record_call(id == 0);
        id
    }

    fn construct_graph(&mut self, graph: GraphId) -> i32 {
        self.graph_op("construct_graph", b"soc_controller_construct_graph\0", graph)
    }

    fn execute_graph(&mut self, graph: GraphId, use_input_buffer: bool) -> i32 {
        if use_input_buffer && !self.input_buffer.bytes().is_empty() {
            let code = self.flush_input_buffer();
            if code != 0 {
                self.stats.record_call(true);
                return code;
            }
            self.stats
                .record_staged(self.input_buffer.bytes().len() as u64);
        }
        self.graph_op("execute_graph", b"soc_controller_execute_graph\0", graph)
    }

    fn teardown_graph(&mut self, graph: GraphId) -> i32 {
        self.graph_op("teardown_graph", b"soc_controller_teardown_graph\0", graph)
    }

    fn append_const_node(
        &mut self,
        name: &str,
        graph: GraphId,
        node_id: i32,
        shape: NodeShape,
        data: &[u8],
    ) -> i32 {
        let c_name = match CString::new(name) {
            Ok(s) => s,
            Err(_) => return SYMBOL_ERROR,
        };
        let f: Symbol<AppendConstNodeFn> =
            match unsafe { self.lib.get(b"soc_controller_append_const_node\0") } {
                Ok(f) => f,
                Err(e) => {
                    tracing::error!(error = %e, "vendor symbol missing");
                    self.stats.record_call(true);
                    return SYMBOL_ERROR;
                }
            };
        let code = unsafe {
            f(
                c_name.as_ptr(),
                graph.raw(),
                node_id,
                shape.batch as i32,
                shape.height as i32,
                shape.width as i32,
                shape.depth as i32,
                data.as_ptr(),
                data.len() as i32,
            )
        };
        self.stats.record_call(code != 0);
        code
    }

    fn append_node(
        &mut self,
        name: &str,
        graph: GraphId,
        node_id: i32,
        op_id: i32,
        padding_id: i32,
        inputs: &[InputDescriptor],
        outputs: &[OutputDescriptor],
    ) -> i32 {
        let c_name = match CString::new(name) {
            Ok(s) => s,
            Err(_) => return SYMBOL_ERROR,
        };
        let raw_inputs: Vec<RawInput> = inputs
            .iter()
            .map(|d| RawInput {
                src_id: d.source_node_id,
                output_idx: d.output_port_index,
            })
            .collect();
        let raw_outputs: Vec<RawOutput> = outputs
            .iter()
            .map(|d| RawOutput {
                max_size: d.max_byte_size as u32,
            })
            .collect();
        let f: Symbol<AppendNodeFn> = match unsafe { self.lib.get(b"soc_controller_append_node\0") }
        {
            Ok(f) => f,
            Err(e) => {
                tracing::error!(error = %e, "vendor symbol missing");
                self.stats.record_call(true);
                return SYMBOL_ERROR;
            }
        };
        let code = unsafe {
            f(
                c_name.as_ptr(),
                graph.raw(),
                node_id,
                op_id,
                padding_id,
                raw_inputs.as_ptr(),
                raw_inputs.len() as i32,
                raw_outputs.as_ptr(),
                raw_outputs.len() as i32,
            )
        };
        self.stats.record_call(code != 0);
        code
    }

    fn input_node_buffer(&mut self) -> &mut FloatNodeData {
        &mut self.input_buffer
    }

    fn read_output_node_float(&mut self, node_name: &str) -> Result<Vec<f32>> {
        let c_name = CString::new(node_name)
            .map_err(|_| SocGraphError::Config(format!("node name {node_name:?} contains NUL")))?;
        let f: Symbol<ReadOutputFloatFn> =
            unsafe { self.lib.get(b"soc_controller_read_output_node_float\0") }?;
        let mut size: i32 = -1;
        let ptr = unsafe { f(c_name.as_ptr(), &mut size) };
        if size < 0 || ptr.is_null() {
            self.stats.record_call(true);
            return Err(SocGraphError::Controller {
                op: "read_output_node_float",
                code: size,
            });
        }
        self.stats.record_call(false);
        // The vendor keeps the buffer alive until the next read; copy out.
        let data = unsafe { std::slice::from_raw_parts(ptr, size as usize) }.to_vec();
        Ok(data)
    }

    fn set_dummy_input_enabled(&mut self, enabled: bool) {
        if let Ok(f) = unsafe {
            self.lib
                .get::<EnableDummyInputFn>(b"soc_controller_enable_dummy_input\0")
        } {
            unsafe { f(enabled as u8) };
        }
        self.dummy_input = enabled;
    }

    fn dummy_input_enabled(&self) -> bool {
        self.dummy_input
    }

    fn load_dummy_input(&mut self, version: i32) -> Result<()> {
        let f: Symbol<LoadDummyInputFn> =
            unsafe { self.lib.get(b"soc_controller_load_dummy_input\0") }?;
        let code = unsafe { f(version) };
        self.stats.record_call(code != 0);
        if code != 0 {
            return Err(SocGraphError::Controller {
                op: "load_dummy_input",
                code,
            });
        }
        Ok(())
    }

    fn set_log_level(&mut self, level: i32) {
        if let Ok(f) = unsafe {
            self.lib
                .get::<SetLogLevelFn>(b"soc_controller_set_log_level\0")
        } {
            unsafe { f(level) };
        }
    }

    fn stats(&self) -> &ControllerStats {
        &self.stats
    }
}
