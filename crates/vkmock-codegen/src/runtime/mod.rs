//! In-process model of the generated backend's shared state.
//!
//! The emitted C++ keeps its state in process-wide statics. This module owns
//! the same state in an explicit [`BackendContext`], one `Mutex` around all
//! of it, so the behavior the generated bodies encode (handle minting, queue
//! retrieval, memory mapping, loader negotiation, two-call enumeration) can
//! be exercised directly. Each context is independent; tests create a fresh
//! one.

use crate::allocate::{AllocationPlan, Cardinality, HandleKind};
use crate::extensions::{ExtensionEntry, ExtensionTables};
use crate::ir::ExtensionScope;
use crate::output::prelude::SUPPORTED_LOADER_ICD_INTERFACE_VERSION;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Magic value the loader expects at the start of a dispatchable object.
pub const ICD_LOADER_MAGIC: usize = 0x01CD_C0DE;

/// `VK_WHOLE_SIZE`.
pub const WHOLE_SIZE: u64 = u64::MAX;

/// Bytes allocated when a whole-size mapping is requested.
pub const WHOLE_SIZE_MAPPING: usize = 0x10000;

/// `VK_MAX_EXTENSION_NAME_SIZE`.
pub const MAX_EXTENSION_NAME_SIZE: usize = 256;

/// Result codes the backend returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VkResult {
    Success,
    Incomplete,
    ErrorIncompatibleDriver,
}

impl VkResult {
    /// Numeric `VkResult` value.
    pub fn code(self) -> i32 {
        match self {
            VkResult::Success => 0,
            VkResult::Incomplete => 5,
            VkResult::ErrorIncompatibleDriver => -9,
        }
    }
}

/// Loader-visible header of a dispatchable object.
#[derive(Debug)]
#[repr(C)]
pub struct LoaderData {
    pub loader_magic: usize,
}

/// A dispatchable handle: a live heap object whose address is its identity.
///
/// Dropping the handle frees the object.
#[derive(Debug)]
pub struct DispatchableHandle(Box<LoaderData>);

impl DispatchableHandle {
    fn new() -> Self {
        Self(Box::new(LoaderData {
            loader_magic: ICD_LOADER_MAGIC,
        }))
    }

    pub fn address(&self) -> usize {
        &*self.0 as *const LoaderData as usize
    }

    pub fn has_loader_magic(&self) -> bool {
        self.0.loader_magic == ICD_LOADER_MAGIC
    }
}

impl PartialEq for DispatchableHandle {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl Eq for DispatchableHandle {}

/// A handle produced by an acquisition.
#[derive(Debug, PartialEq, Eq)]
pub enum MintedHandle {
    Dispatchable(DispatchableHandle),
    NonDispatchable(u64),
}

impl MintedHandle {
    /// Identity: the address of a dispatchable object, or the counter value.
    pub fn identity(&self) -> u64 {
        match self {
            MintedHandle::Dispatchable(handle) => handle.address() as u64,
            MintedHandle::NonDispatchable(value) => *value,
        }
    }

    pub fn as_non_dispatchable(&self) -> Option<u64> {
        match self {
            MintedHandle::NonDispatchable(value) => Some(*value),
            MintedHandle::Dispatchable(_) => None,
        }
    }
}

/// `VkExtensionProperties`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionProperties {
    pub extension_name: [u8; MAX_EXTENSION_NAME_SIZE],
    pub spec_version: u32,
}

impl Default for ExtensionProperties {
    fn default() -> Self {
        Self {
            extension_name: [0; MAX_EXTENSION_NAME_SIZE],
            spec_version: 0,
        }
    }
}

impl ExtensionProperties {
    fn from_entry(entry: &ExtensionEntry) -> Self {
        let mut props = Self {
            spec_version: entry.version,
            ..Self::default()
        };
        // Leave room for the terminating NUL.
        let len = entry.name.len().min(MAX_EXTENSION_NAME_SIZE - 1);
        props.extension_name[..len].copy_from_slice(&entry.name.as_bytes()[..len]);
        props
    }

    /// Name up to the first NUL.
    pub fn name(&self) -> &str {
        let end = self
            .extension_name
            .iter()
            .position(|b| *b == 0)
            .unwrap_or(MAX_EXTENSION_NAME_SIZE);
        std::str::from_utf8(&self.extension_name[..end]).unwrap_or("")
    }
}

#[derive(Debug)]
struct State {
    next_handle: u64,
    queues: HashMap<(usize, u32, u32), DispatchableHandle>,
    mapped: HashMap<u64, Vec<Vec<u8>>>,
    loader_interface_version: u32,
    negotiated: bool,
}

impl Default for State {
    fn default() -> Self {
        Self {
            next_handle: 1,
            queues: HashMap::new(),
            mapped: HashMap::new(),
            loader_interface_version: 0,
            negotiated: false,
        }
    }
}

impl State {
    fn mint_non_dispatchable(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }
}

/// Shared backend state behind a single lock.
#[derive(Debug, Default)]
pub struct BackendContext {
    state: Mutex<State>,
    tables: ExtensionTables,
}

impl BackendContext {
    /// A fresh context advertising `tables`.
    pub fn new(tables: ExtensionTables) -> Self {
        Self {
            state: Mutex::default(),
            tables,
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // Every mutation completes before the guard drops, so a poisoned
        // lock still protects consistent state.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Next value of the non-dispatchable counter, shared by all handle types.
    pub fn mint_non_dispatchable(&self) -> u64 {
        self.state().mint_non_dispatchable()
    }

    /// A new tagged dispatchable object.
    pub fn mint_dispatchable(&self) -> DispatchableHandle {
        DispatchableHandle::new()
    }

    /// Run an allocation plan: one handle for a scalar output, `len` for an
    /// array output. The lock is held across the whole batch.
    pub fn execute_acquire(&self, plan: &AllocationPlan, len: usize) -> Vec<MintedHandle> {
        let count = match plan.cardinality {
            Cardinality::Single => 1,
            Cardinality::Array { .. } => len,
        };
        let mut state = self.state();
        (0..count)
            .map(|_| match plan.kind {
                HandleKind::Dispatchable => MintedHandle::Dispatchable(DispatchableHandle::new()),
                HandleKind::NonDispatchable => {
                    MintedHandle::NonDispatchable(state.mint_non_dispatchable())
                }
            })
            .collect()
    }

    /// Queue `(family, index)` of `device`, created on first request.
    pub fn get_device_queue(&self, device: usize, family: u32, index: u32) -> usize {
        self.state()
            .queues
            .entry((device, family, index))
            .or_insert_with(DispatchableHandle::new)
            .address()
    }

    /// Destroy a device and every queue retrieved from it.
    ///
    /// Returns the number of queues released.
    pub fn destroy_device(&self, device: DispatchableHandle) -> usize {
        let id = device.address();
        let mut state = self.state();
        let before = state.queues.len();
        state.queues.retain(|(owner, _, _), _| *owner != id);
        before - state.queues.len()
    }

    /// Map `size` bytes of `memory`; [`WHOLE_SIZE`] maps a fixed-size region.
    ///
    /// Returns the address of the mapping, or `None` when the region cannot
    /// be allocated (the generated `malloc` yields null there).
    pub fn map_memory(&self, memory: u64, size: u64) -> Option<usize> {
        let len = if size == WHOLE_SIZE {
            WHOLE_SIZE_MAPPING
        } else {
            usize::try_from(size).ok()?
        };
        // Reserved, never written: the model only needs a unique live address.
        let mut region: Vec<u8> = Vec::new();
        if let Err(e) = region.try_reserve_exact(len) {
            tracing::warn!(memory, size, error = %e, "mapping allocation failed");
            return None;
        }
        let address = region.as_ptr() as usize;
        self.state().mapped.entry(memory).or_default().push(region);
        Some(address)
    }

    /// Release every mapping of `memory`; returns how many were freed.
    pub fn unmap_memory(&self, memory: u64) -> usize {
        self.state()
            .mapped
            .remove(&memory)
            .map_or(0, |regions| regions.len())
    }

    /// Number of live mappings of `memory`.
    pub fn mapping_count(&self, memory: u64) -> usize {
        self.state().mapped.get(&memory).map_or(0, Vec::len)
    }

    /// `vk_icdNegotiateLoaderICDInterfaceVersion`: record the loader's
    /// version and return the version both sides support.
    pub fn negotiate_loader_interface_version(&self, requested: u32) -> u32 {
        let mut state = self.state();
        state.negotiated = true;
        state.loader_interface_version = requested;
        requested.min(SUPPORTED_LOADER_ICD_INTERFACE_VERSION)
    }

    /// `vk_icdGetInstanceProcAddr` before negotiation implies a version 1
    /// loader.
    pub fn assume_legacy_loader(&self) {
        let mut state = self.state();
        if !state.negotiated {
            state.loader_interface_version = 1;
        }
    }

    pub fn loader_interface_version(&self) -> u32 {
        self.state().loader_interface_version
    }

    /// `vkCreateInstance`: loaders at interface version 4 or older are
    /// rejected.
    pub fn create_instance(&self) -> Result<DispatchableHandle, VkResult> {
        if self.loader_interface_version() <= 4 {
            tracing::debug!("rejecting loader with interface version <= 4");
            return Err(VkResult::ErrorIncompatibleDriver);
        }
        Ok(DispatchableHandle::new())
    }

    /// Two-call enumeration of the advertised extensions.
    ///
    /// With `properties == None`, writes the total into `count`. Otherwise
    /// `count` is the caller's capacity on entry and the number written on
    /// return; [`VkResult::Incomplete`] signals truncation.
    pub fn enumerate_extension_properties(
        &self,
        scope: ExtensionScope,
        count: &mut u32,
        properties: Option<&mut [ExtensionProperties]>,
    ) -> VkResult {
        let entries = match scope {
            ExtensionScope::Instance => &self.tables.instance,
            ExtensionScope::Device => &self.tables.device,
        };
        let Some(properties) = properties else {
            *count = entries.len() as u32;
            return VkResult::Success;
        };

        let capacity = (*count as usize).min(properties.len());
        let written = capacity.min(entries.len());
        for (slot, entry) in properties.iter_mut().zip(entries).take(written) {
            *slot = ExtensionProperties::from_entry(entry);
        }
        *count = written as u32;
        if written < entries.len() {
            VkResult::Incomplete
        } else {
            VkResult::Success
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::ExtensionFilter;
    use crate::ir::Extension;
    use std::collections::HashSet;

    fn scalar(kind: HandleKind, ty: &str) -> AllocationPlan {
        AllocationPlan {
            target: "pHandle".into(),
            handle_type: ty.into(),
            kind,
            cardinality: Cardinality::Single,
        }
    }

    fn array(kind: HandleKind) -> AllocationPlan {
        AllocationPlan {
            target: "pHandles".into(),
            handle_type: "VkCommandBuffer".into(),
            kind,
            cardinality: Cardinality::Array {
                len: "pAllocateInfo->commandBufferCount".into(),
            },
        }
    }

    fn context() -> BackendContext {
        let tables = ExtensionFilter::default().build_tables(&[
            Extension::new("VK_KHR_surface", 25).with_scope(ExtensionScope::Instance),
            Extension::new("VK_KHR_xlib_surface", 6).with_scope(ExtensionScope::Instance),
            Extension::new("VK_KHR_win32_surface", 6).with_scope(ExtensionScope::Instance),
            Extension::new("VK_KHR_swapchain", 68),
            Extension::new("VK_EXT_validation_cache", 1),
        ]);
        BackendContext::new(tables)
    }

    #[test]
    fn create_widget_scenario() {
        let ctx = BackendContext::default();
        let handles = ctx.execute_acquire(&scalar(HandleKind::NonDispatchable, "VkWidget"), 0);
        assert_eq!(handles, vec![MintedHandle::NonDispatchable(1)]);
    }

    #[test]
    fn counter_is_shared_across_handle_types() {
        let ctx = BackendContext::default();
        let fence = ctx.execute_acquire(&scalar(HandleKind::NonDispatchable, "VkFence"), 0);
        let sem = ctx.execute_acquire(&scalar(HandleKind::NonDispatchable, "VkSemaphore"), 0);
        let k = fence[0].as_non_dispatchable().unwrap();
        assert_eq!(sem[0].as_non_dispatchable(), Some(k + 1));
        assert_eq!(ctx.mint_non_dispatchable(), k + 2);
    }

    #[test]
    fn array_acquire_yields_distinct_handles() {
        let ctx = BackendContext::default();
        for kind in [HandleKind::Dispatchable, HandleKind::NonDispatchable] {
            let handles = ctx.execute_acquire(&array(kind), 8);
            assert_eq!(handles.len(), 8);
            let ids: HashSet<_> = handles.iter().map(MintedHandle::identity).collect();
            assert_eq!(ids.len(), 8);
        }
        assert!(ctx.execute_acquire(&array(HandleKind::NonDispatchable), 0).is_empty());
    }

    #[test]
    fn dispatchable_handles_carry_loader_magic() {
        let ctx = BackendContext::default();
        let a = ctx.mint_dispatchable();
        let b = ctx.mint_dispatchable();
        assert!(a.has_loader_magic());
        assert_ne!(a, b);
    }

    #[test]
    fn concurrent_minting_never_repeats() {
        let ctx = BackendContext::default();
        let mut all: Vec<u64> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| (0..250).map(|_| ctx.mint_non_dispatchable()).collect::<Vec<_>>())
                })
                .collect();
            workers
                .into_iter()
                .flat_map(|w| w.join().unwrap())
                .collect()
        });
        all.sort_unstable();
        assert_eq!(all, (1..=1000).collect::<Vec<_>>());
    }

    #[test]
    fn queues_are_stable_and_owned_by_device() {
        let ctx = BackendContext::default();
        let device = ctx.mint_dispatchable();
        let id = device.address();
        let q = ctx.get_device_queue(id, 0, 0);
        assert_eq!(ctx.get_device_queue(id, 0, 0), q);
        assert_ne!(ctx.get_device_queue(id, 0, 1), q);
        assert_eq!(ctx.destroy_device(device), 2);
    }

    #[test]
    fn map_and_unmap() {
        let ctx = BackendContext::default();
        let a = ctx.map_memory(7, WHOLE_SIZE).unwrap();
        let b = ctx.map_memory(7, 64).unwrap();
        assert_ne!(a, b);
        assert_eq!(ctx.mapping_count(7), 2);
        assert_eq!(ctx.unmap_memory(7), 2);
        assert_eq!(ctx.unmap_memory(7), 0);
    }

    #[test]
    fn oversized_mapping_fails_without_aborting() {
        let ctx = BackendContext::default();
        assert_eq!(ctx.map_memory(9, WHOLE_SIZE - 1), None);
        assert_eq!(ctx.mapping_count(9), 0);
        assert!(ctx.map_memory(9, 16).is_some());
        assert_eq!(ctx.mapping_count(9), 1);
    }

    #[test]
    fn loader_negotiation() {
        let ctx = BackendContext::default();
        assert_eq!(ctx.create_instance(), Err(VkResult::ErrorIncompatibleDriver));

        assert_eq!(ctx.negotiate_loader_interface_version(7), 5);
        ctx.assume_legacy_loader();
        assert_eq!(ctx.loader_interface_version(), 7);
        assert!(ctx.create_instance().is_ok());

        let legacy = BackendContext::default();
        legacy.assume_legacy_loader();
        assert_eq!(legacy.loader_interface_version(), 1);
        assert_eq!(legacy.negotiate_loader_interface_version(4), 4);
        assert!(legacy.create_instance().is_err());
    }

    #[test]
    fn enumeration_reports_count() {
        let ctx = context();
        let mut count = 0;
        assert_eq!(
            ctx.enumerate_extension_properties(ExtensionScope::Instance, &mut count, None),
            VkResult::Success
        );
        assert_eq!(count, 3);
        ctx.enumerate_extension_properties(ExtensionScope::Device, &mut count, None);
        assert_eq!(count, 1, "denied extensions are not advertised");
    }

    #[test]
    fn enumeration_truncates() {
        let ctx = context();
        let mut props = [ExtensionProperties::default(); 2];
        let mut count = 2;
        let result =
            ctx.enumerate_extension_properties(ExtensionScope::Instance, &mut count, Some(&mut props));
        assert_eq!(result, VkResult::Incomplete);
        assert_eq!(result.code(), 5);
        assert_eq!(count, 2);
        assert_eq!(props[0].name(), "VK_KHR_surface");
        assert_eq!(props[1].name(), "VK_KHR_xlib_surface");
    }

    #[test]
    fn enumeration_fills_all() {
        let ctx = context();
        let mut props = [ExtensionProperties::default(); 5];
        let mut count = 5;
        let result =
            ctx.enumerate_extension_properties(ExtensionScope::Instance, &mut count, Some(&mut props));
        assert_eq!(result, VkResult::Success);
        assert_eq!(count, 3);
        let names: Vec<_> = props[..3].iter().map(|p| (p.name(), p.spec_version)).collect();
        assert_eq!(
            names,
            [
                ("VK_KHR_surface", 25),
                ("VK_KHR_xlib_surface", 6),
                ("VK_KHR_win32_surface", 6)
            ]
        );
        assert_eq!(props[3], ExtensionProperties::default());
    }
}
