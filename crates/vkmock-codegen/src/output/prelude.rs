//! Fixed C++ text framing the generated artifacts.
//!
//! Everything here is constant payload: shared state declarations, the
//! physical-device limit values, the export macro. Nothing is derived from
//! the API description except where a function takes the namespace.

use std::fmt::Write;

/// Standard headers pulled in by the generated header.
pub const HEADER_INCLUDES: &[&str] = &[
    "#include <unordered_map>",
    "#include <mutex>",
    "#include <string>",
    "#include <cstring>",
    "#include \"vulkan/vk_icd.h\"",
];

/// Standard headers pulled in by the generated source, after the header.
pub const SOURCE_INCLUDES: &[&str] = &["#include <stdlib.h>", "#include <vector>"];

/// Loader/ICD interface version the generated backend negotiates up to.
pub const SUPPORTED_LOADER_ICD_INTERFACE_VERSION: u32 = 5;

/// Shared state declared at the top of the header namespace.
pub fn shared_state() -> String {
    format!(
        r#"using mutex_t = std::mutex;
using lock_guard_t = std::lock_guard<mutex_t>;
using unique_lock_t = std::unique_lock<mutex_t>;

static mutex_t global_lock;
static uint64_t global_unique_handle = 1;
static const uint32_t SUPPORTED_LOADER_ICD_INTERFACE_VERSION = {SUPPORTED_LOADER_ICD_INTERFACE_VERSION};
static uint32_t loader_interface_version = 0;
static bool negotiate_loader_icd_interface_called = false;

static void* CreateDispObjHandle() {{
    auto handle = new VK_LOADER_DATA;
    set_loader_magic_value(handle);
    return handle;
}}

static void DestroyDispObjHandle(void* handle) {{
    delete reinterpret_cast<VK_LOADER_DATA*>(handle);
}}
"#
    )
}

/// Tables owned by the source file.
pub const SOURCE_STATE: &str = r#"using std::unordered_map;

// Mapped allocations per memory object, freed on unmap
static unordered_map<VkDeviceMemory, std::vector<void*>> mapped_memory_map;

static VkPhysicalDevice physical_device = nullptr;
static unordered_map<VkDevice, unordered_map<uint32_t, unordered_map<uint32_t, VkQueue>>> queue_map;
"#;

/// Physical-device limits reported by the backend, `(field, value)`.
pub const DEVICE_LIMITS: &[(&str, &str)] = &[
    ("maxImageDimension1D", "4096"),
    ("maxImageDimension2D", "4096"),
    ("maxImageDimension3D", "256"),
    ("maxImageDimensionCube", "4096"),
    ("maxImageArrayLayers", "256"),
    ("maxTexelBufferElements", "65536"),
    ("maxUniformBufferRange", "16384"),
    ("maxStorageBufferRange", "134217728"),
    ("maxPushConstantsSize", "128"),
    ("maxMemoryAllocationCount", "4096"),
    ("maxSamplerAllocationCount", "4000"),
    ("bufferImageGranularity", "1"),
    ("sparseAddressSpaceSize", "2147483648"),
    ("maxBoundDescriptorSets", "4"),
    ("maxPerStageDescriptorSamplers", "16"),
    ("maxPerStageDescriptorUniformBuffers", "12"),
    ("maxPerStageDescriptorStorageBuffers", "4"),
    ("maxPerStageDescriptorSampledImages", "16"),
    ("maxPerStageDescriptorStorageImages", "4"),
    ("maxPerStageDescriptorInputAttachments", "4"),
    ("maxPerStageResources", "128"),
    ("maxDescriptorSetSamplers", "96"),
    ("maxDescriptorSetUniformBuffers", "72"),
    ("maxDescriptorSetUniformBuffersDynamic", "8"),
    ("maxDescriptorSetStorageBuffers", "24"),
    ("maxDescriptorSetStorageBuffersDynamic", "4"),
    ("maxDescriptorSetSampledImages", "96"),
    ("maxDescriptorSetStorageImages", "24"),
    ("maxDescriptorSetInputAttachments", "4"),
    ("maxVertexInputAttributes", "16"),
    ("maxVertexInputBindings", "16"),
    ("maxVertexInputAttributeOffset", "2047"),
    ("maxVertexInputBindingStride", "2048"),
    ("maxVertexOutputComponents", "64"),
    ("maxTessellationGenerationLevel", "64"),
    ("maxTessellationPatchSize", "32"),
    ("maxTessellationControlPerVertexInputComponents", "64"),
    ("maxTessellationControlPerVertexOutputComponents", "64"),
    ("maxTessellationControlPerPatchOutputComponents", "120"),
    ("maxTessellationControlTotalOutputComponents", "2048"),
    ("maxTessellationEvaluationInputComponents", "64"),
    ("maxTessellationEvaluationOutputComponents", "64"),
    ("maxGeometryShaderInvocations", "32"),
    ("maxGeometryInputComponents", "64"),
    ("maxGeometryOutputComponents", "64"),
    ("maxGeometryOutputVertices", "256"),
    ("maxGeometryTotalOutputComponents", "1024"),
    ("maxFragmentInputComponents", "64"),
    ("maxFragmentOutputAttachments", "4"),
    ("maxFragmentDualSrcAttachments", "1"),
    ("maxFragmentCombinedOutputResources", "4"),
    ("maxComputeSharedMemorySize", "16384"),
    ("maxComputeWorkGroupCount[0]", "65535"),
    ("maxComputeWorkGroupCount[1]", "65535"),
    ("maxComputeWorkGroupCount[2]", "65535"),
    ("maxComputeWorkGroupInvocations", "128"),
    ("maxComputeWorkGroupSize[0]", "128"),
    ("maxComputeWorkGroupSize[1]", "128"),
    ("maxComputeWorkGroupSize[2]", "64"),
    ("subPixelPrecisionBits", "4"),
    ("subTexelPrecisionBits", "4"),
    ("mipmapPrecisionBits", "4"),
    ("maxDrawIndexedIndexValue", "UINT32_MAX"),
    ("maxDrawIndirectCount", "UINT16_MAX"),
    ("maxSamplerLodBias", "2.0f"),
    ("maxSamplerAnisotropy", "16"),
    ("maxViewports", "16"),
    ("maxViewportDimensions[0]", "4096"),
    ("maxViewportDimensions[1]", "4096"),
    ("viewportBoundsRange[0]", "-8192"),
    ("viewportBoundsRange[1]", "8191"),
    ("viewportSubPixelBits", "0"),
    ("minMemoryMapAlignment", "64"),
    ("minTexelBufferOffsetAlignment", "16"),
    ("minUniformBufferOffsetAlignment", "16"),
    ("minStorageBufferOffsetAlignment", "16"),
    ("minTexelOffset", "-8"),
    ("maxTexelOffset", "7"),
    ("minTexelGatherOffset", "-8"),
    ("maxTexelGatherOffset", "7"),
    ("minInterpolationOffset", "0.0f"),
    ("maxInterpolationOffset", "0.5f"),
    ("subPixelInterpolationOffsetBits", "4"),
    ("maxFramebufferWidth", "4096"),
    ("maxFramebufferHeight", "4096"),
    ("maxFramebufferLayers", "256"),
    ("framebufferColorSampleCounts", "0x7F"),
    ("framebufferDepthSampleCounts", "0x7F"),
    ("framebufferStencilSampleCounts", "0x7F"),
    ("framebufferNoAttachmentsSampleCounts", "0x7F"),
    ("maxColorAttachments", "4"),
    ("sampledImageColorSampleCounts", "0x7F"),
    ("sampledImageIntegerSampleCounts", "0x7F"),
    ("sampledImageDepthSampleCounts", "0x7F"),
    ("sampledImageStencilSampleCounts", "0x7F"),
    ("storageImageSampleCounts", "0x7F"),
    ("maxSampleMaskWords", "1"),
    ("timestampComputeAndGraphics", "VK_TRUE"),
    ("timestampPeriod", "1"),
    ("maxClipDistances", "8"),
    ("maxCullDistances", "8"),
    ("maxCombinedClipAndCullDistances", "8"),
    ("discreteQueuePriorities", "2"),
    ("pointSizeRange[0]", "1.0f"),
    ("pointSizeRange[1]", "64.0f"),
    ("lineWidthRange[0]", "1.0f"),
    ("lineWidthRange[1]", "8.0f"),
    ("pointSizeGranularity", "1.0f"),
    ("lineWidthGranularity", "1.0f"),
    ("strictLines", "VK_TRUE"),
    ("standardSampleLocations", "VK_TRUE"),
    ("optimalBufferCopyOffsetAlignment", "1"),
    ("optimalBufferCopyRowPitchAlignment", "1"),
    ("nonCoherentAtomSize", "256"),
];

/// `SetLimits`, filling a `VkPhysicalDeviceLimits` from [`DEVICE_LIMITS`].
pub fn set_limits() -> String {
    let mut out =
        String::from("static VkPhysicalDeviceLimits SetLimits(VkPhysicalDeviceLimits *limits) {\n");
    for (field, value) in DEVICE_LIMITS {
        writeln!(out, "    limits->{field} = {value};").unwrap();
    }
    out.push_str("\n    return *limits;\n}\n");
    out
}

/// Resolver used by the loader for physical-device level entry points.
pub const PHYSICAL_DEVICE_PROC_ADDR: &str = r#"static VKAPI_ATTR PFN_vkVoidFunction VKAPI_CALL GetPhysicalDeviceProcAddr(VkInstance instance, const char *funcName) {
    const auto &item = name_to_funcptr_map.find(funcName);
    if (item != name_to_funcptr_map.end()) {
        return reinterpret_cast<PFN_vkVoidFunction>(item->second);
    }
    // Every entry point is intercepted; anything else is unknown
    return nullptr;
}
"#;

/// Symbol visibility macro for the C-linkage exports.
pub const EXPORT_MACRO: &str = r#"#if defined(__GNUC__) && __GNUC__ >= 4
#define EXPORT __attribute__((visibility("default")))
#elif defined(__SUNPRO_C) && (__SUNPRO_C >= 0x590)
#define EXPORT __attribute__((visibility("default")))
#else
#define EXPORT
#endif
"#;

/// Loader interface entry points, calling into namespace `ns`.
pub fn loader_exports(ns: &str) -> String {
    format!(
        r#"EXPORT VKAPI_ATTR PFN_vkVoidFunction VKAPI_CALL vk_icdGetInstanceProcAddr(VkInstance instance, const char* pName) {{
    if (!{ns}::negotiate_loader_icd_interface_called) {{
        {ns}::loader_interface_version = 1;
    }}
    return {ns}::GetInstanceProcAddr(instance, pName);
}}

EXPORT VKAPI_ATTR PFN_vkVoidFunction VKAPI_CALL vk_icdGetPhysicalDeviceProcAddr(VkInstance instance, const char* pName) {{
    return {ns}::GetPhysicalDeviceProcAddr(instance, pName);
}}

EXPORT VKAPI_ATTR VkResult VKAPI_CALL vk_icdNegotiateLoaderICDInterfaceVersion(uint32_t* pSupportedVersion) {{
    {ns}::negotiate_loader_icd_interface_called = true;
    {ns}::loader_interface_version = *pSupportedVersion;
    if (*pSupportedVersion > {ns}::SUPPORTED_LOADER_ICD_INTERFACE_VERSION) {{
        *pSupportedVersion = {ns}::SUPPORTED_LOADER_ICD_INTERFACE_VERSION;
    }}
    return VK_SUCCESS;
}}
"#
    )
}

/// Windowing-system commands the loader calls directly by symbol.
///
/// Each one present in the description gets a C-linkage forwarder.
pub const EXPORTED_SURFACE_COMMANDS: &[&str] = &[
    "vkDestroySurfaceKHR",
    "vkGetPhysicalDeviceSurfaceSupportKHR",
    "vkGetPhysicalDeviceSurfaceCapabilitiesKHR",
    "vkGetPhysicalDeviceSurfaceFormatsKHR",
    "vkGetPhysicalDeviceSurfacePresentModesKHR",
    "vkCreateDisplayPlaneSurfaceKHR",
    "vkCreateXlibSurfaceKHR",
    "vkCreateXcbSurfaceKHR",
    "vkCreateWaylandSurfaceKHR",
    "vkCreateMirSurfaceKHR",
    "vkCreateAndroidSurfaceKHR",
    "vkCreateWin32SurfaceKHR",
    "vkGetDeviceGroupSurfacePresentModesKHR",
    "vkGetDeviceGroupSurfacePresentModesKHX",
    "vkGetPhysicalDevicePresentRectanglesKHR",
    "vkGetPhysicalDevicePresentRectanglesKHX",
    "vkCreateViSurfaceNN",
    "vkGetPhysicalDeviceSurfaceCapabilities2EXT",
    "vkCreateIOSSurfaceMVK",
    "vkCreateMacOSSurfaceMVK",
];
