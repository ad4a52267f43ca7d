//! Hand-written command bodies.
//!
//! Each body is emitted verbatim between the braces of the generated
//! definition. Bodies may refer to the shared state declared by the header
//! and source preludes (`global_lock`, `queue_map`, `mapped_memory_map`,
//! `physical_device`, the extension maps and `name_to_funcptr_map`).

pub(super) const DECLARE_ONLY: &[&str] = &[];

pub(super) const BODIES: &[(&str, &str)] = &[
    (
        "vkCreateInstance",
        r#"    // Loaders at interface version 4 or older cannot drive this driver.
    if (loader_interface_version <= 4) {
        return VK_ERROR_INCOMPATIBLE_DRIVER;
    }
    *pInstance = (VkInstance)CreateDispObjHandle();
    return VK_SUCCESS;
"#,
    ),
    (
        "vkDestroyInstance",
        r#"    if (physical_device) {
        DestroyDispObjHandle((void*)physical_device);
        physical_device = nullptr;
    }
    DestroyDispObjHandle((void*)instance);
"#,
    ),
    (
        "vkEnumeratePhysicalDevices",
        r#"    if (pPhysicalDevices) {
        if (!physical_device) {
            physical_device = (VkPhysicalDevice)CreateDispObjHandle();
        }
        *pPhysicalDevices = physical_device;
    } else {
        *pPhysicalDeviceCount = 1;
    }
    return VK_SUCCESS;
"#,
    ),
    (
        "vkCreateDevice",
        r#"    *pDevice = (VkDevice)CreateDispObjHandle();
    return VK_SUCCESS;
"#,
    ),
    (
        "vkDestroyDevice",
        r#"    unique_lock_t lock(global_lock);
    // Queues are owned by the device.
    for (auto &family_map : queue_map[device]) {
        for (auto &index_queue : family_map.second) {
            DestroyDispObjHandle((void*)index_queue.second);
        }
    }
    queue_map.erase(device);
    DestroyDispObjHandle((void*)device);
"#,
    ),
    (
        "vkGetDeviceQueue",
        r#"    unique_lock_t lock(global_lock);
    auto queue = queue_map[device][queueFamilyIndex][queueIndex];
    if (queue) {
        *pQueue = queue;
    } else {
        *pQueue = queue_map[device][queueFamilyIndex][queueIndex] = (VkQueue)CreateDispObjHandle();
    }
"#,
    ),
    (
        "vkEnumerateInstanceLayerProperties",
        r#"    if (!pProperties) {
        *pPropertyCount = 0;
    }
    return VK_SUCCESS;
"#,
    ),
    (
        "vkEnumerateDeviceLayerProperties",
        r#"    if (!pProperties) {
        *pPropertyCount = 0;
    }
    return VK_SUCCESS;
"#,
    ),
    (
        "vkEnumerateInstanceExtensionProperties",
        r#"    if (pLayerName) {
        return VK_SUCCESS;
    }
    if (!pProperties) {
        *pPropertyCount = (uint32_t)instance_extension_map.size();
        return VK_SUCCESS;
    }
    uint32_t i = 0;
    for (const auto &name_ver_pair : instance_extension_map) {
        if (i == *pPropertyCount) {
            break;
        }
        std::strncpy(pProperties[i].extensionName, name_ver_pair.first.c_str(), sizeof(pProperties[i].extensionName));
        pProperties[i].extensionName[sizeof(pProperties[i].extensionName) - 1] = 0;
        pProperties[i].specVersion = name_ver_pair.second;
        ++i;
    }
    *pPropertyCount = i;
    if (i != instance_extension_map.size()) {
        return VK_INCOMPLETE;
    }
    return VK_SUCCESS;
"#,
    ),
    (
        "vkEnumerateDeviceExtensionProperties",
        r#"    if (pLayerName) {
        return VK_SUCCESS;
    }
    if (!pProperties) {
        *pPropertyCount = (uint32_t)device_extension_map.size();
        return VK_SUCCESS;
    }
    uint32_t i = 0;
    for (const auto &name_ver_pair : device_extension_map) {
        if (i == *pPropertyCount) {
            break;
        }
        std::strncpy(pProperties[i].extensionName, name_ver_pair.first.c_str(), sizeof(pProperties[i].extensionName));
        pProperties[i].extensionName[sizeof(pProperties[i].extensionName) - 1] = 0;
        pProperties[i].specVersion = name_ver_pair.second;
        ++i;
    }
    *pPropertyCount = i;
    if (i != device_extension_map.size()) {
        return VK_INCOMPLETE;
    }
    return VK_SUCCESS;
"#,
    ),
    (
        "vkGetInstanceProcAddr",
        r#"    if (!negotiate_loader_icd_interface_called) {
        loader_interface_version = 0;
    }
    const auto &item = name_to_funcptr_map.find(pName);
    if (item != name_to_funcptr_map.end()) {
        return reinterpret_cast<PFN_vkVoidFunction>(item->second);
    }
    return nullptr;
"#,
    ),
    (
        "vkGetDeviceProcAddr",
        r#"    return GetInstanceProcAddr(nullptr, pName);
"#,
    ),
    (
        "vkGetPhysicalDeviceMemoryProperties",
        r#"    pMemoryProperties->memoryTypeCount = 2;
    pMemoryProperties->memoryTypes[0].propertyFlags = VK_MEMORY_PROPERTY_HOST_VISIBLE_BIT | VK_MEMORY_PROPERTY_HOST_COHERENT_BIT;
    pMemoryProperties->memoryTypes[0].heapIndex = 0;
    pMemoryProperties->memoryTypes[1].propertyFlags = VK_MEMORY_PROPERTY_DEVICE_LOCAL_BIT | VK_MEMORY_PROPERTY_HOST_VISIBLE_BIT | VK_MEMORY_PROPERTY_HOST_CACHED_BIT | VK_MEMORY_PROPERTY_HOST_COHERENT_BIT;
    pMemoryProperties->memoryTypes[1].heapIndex = 1;
    pMemoryProperties->memoryHeapCount = 2;
    pMemoryProperties->memoryHeaps[0].flags = 0;
    pMemoryProperties->memoryHeaps[0].size = 8000000000;
    pMemoryProperties->memoryHeaps[1].flags = VK_MEMORY_HEAP_DEVICE_LOCAL_BIT;
    pMemoryProperties->memoryHeaps[1].size = 8000000000;
"#,
    ),
    (
        "vkGetPhysicalDeviceMemoryProperties2",
        r#"    GetPhysicalDeviceMemoryProperties(physicalDevice, &pMemoryProperties->memoryProperties);
"#,
    ),
    (
        "vkGetPhysicalDeviceMemoryProperties2KHR",
        r#"    GetPhysicalDeviceMemoryProperties(physicalDevice, &pMemoryProperties->memoryProperties);
"#,
    ),
    (
        "vkGetPhysicalDeviceQueueFamilyProperties",
        r#"    if (!pQueueFamilyProperties) {
        *pQueueFamilyPropertyCount = 1;
    } else if (*pQueueFamilyPropertyCount) {
        pQueueFamilyProperties[0].queueFlags = VK_QUEUE_GRAPHICS_BIT | VK_QUEUE_COMPUTE_BIT | VK_QUEUE_TRANSFER_BIT | VK_QUEUE_SPARSE_BINDING_BIT;
        pQueueFamilyProperties[0].queueCount = 1;
        pQueueFamilyProperties[0].timestampValidBits = 0;
        pQueueFamilyProperties[0].minImageTransferGranularity = {1, 1, 1};
        *pQueueFamilyPropertyCount = 1;
    }
"#,
    ),
    (
        "vkGetPhysicalDeviceQueueFamilyProperties2",
        r#"    if (pQueueFamilyPropertyCount && pQueueFamilyProperties) {
        GetPhysicalDeviceQueueFamilyProperties(physicalDevice, pQueueFamilyPropertyCount, &pQueueFamilyProperties->queueFamilyProperties);
    } else {
        GetPhysicalDeviceQueueFamilyProperties(physicalDevice, pQueueFamilyPropertyCount, nullptr);
    }
"#,
    ),
    (
        "vkGetPhysicalDeviceQueueFamilyProperties2KHR",
        r#"    if (pQueueFamilyPropertyCount && pQueueFamilyProperties) {
        GetPhysicalDeviceQueueFamilyProperties(physicalDevice, pQueueFamilyPropertyCount, &pQueueFamilyProperties->queueFamilyProperties);
    } else {
        GetPhysicalDeviceQueueFamilyProperties(physicalDevice, pQueueFamilyPropertyCount, nullptr);
    }
"#,
    ),
    (
        "vkGetPhysicalDeviceFeatures",
        r#"    uint32_t num_bools = sizeof(VkPhysicalDeviceFeatures) / sizeof(VkBool32);
    VkBool32 *bool_array = &pFeatures->robustBufferAccess;
    for (uint32_t i = 0; i < num_bools; ++i) {
        bool_array[i] = VK_TRUE;
    }
"#,
    ),
    (
        "vkGetPhysicalDeviceFeatures2",
        r#"    GetPhysicalDeviceFeatures(physicalDevice, &pFeatures->features);
"#,
    ),
    (
        "vkGetPhysicalDeviceFeatures2KHR",
        r#"    GetPhysicalDeviceFeatures(physicalDevice, &pFeatures->features);
"#,
    ),
    (
        "vkGetPhysicalDeviceFormatProperties",
        r#"    if (VK_FORMAT_UNDEFINED == format) {
        *pFormatProperties = { 0x0, 0x0, 0x0 };
    } else {
        // Every format reports full support.
        *pFormatProperties = { 0x00FFFFFF, 0x00FFFFFF, 0x00FFFFFF };
    }
"#,
    ),
    (
        "vkGetPhysicalDeviceFormatProperties2",
        r#"    GetPhysicalDeviceFormatProperties(physicalDevice, format, &pFormatProperties->formatProperties);
"#,
    ),
    (
        "vkGetPhysicalDeviceFormatProperties2KHR",
        r#"    GetPhysicalDeviceFormatProperties(physicalDevice, format, &pFormatProperties->formatProperties);
"#,
    ),
    (
        "vkGetPhysicalDeviceImageFormatProperties",
        r#"    // Linear tiling gets a single mip level, layer and sample.
    if (VK_IMAGE_TILING_LINEAR == tiling) {
        *pImageFormatProperties = { { 4096, 4096, 256 }, 1, 1, VK_SAMPLE_COUNT_1_BIT, 4294967296 };
    } else {
        *pImageFormatProperties = { { 4096, 4096, 256 }, 12, 256, 0x7F, 4294967296 };
    }
    return VK_SUCCESS;
"#,
    ),
    (
        "vkGetPhysicalDeviceImageFormatProperties2",
        r#"    GetPhysicalDeviceImageFormatProperties(physicalDevice, pImageFormatInfo->format, pImageFormatInfo->type, pImageFormatInfo->tiling, pImageFormatInfo->usage, pImageFormatInfo->flags, &pImageFormatProperties->imageFormatProperties);
    return VK_SUCCESS;
"#,
    ),
    (
        "vkGetPhysicalDeviceImageFormatProperties2KHR",
        r#"    GetPhysicalDeviceImageFormatProperties(physicalDevice, pImageFormatInfo->format, pImageFormatInfo->type, pImageFormatInfo->tiling, pImageFormatInfo->usage, pImageFormatInfo->flags, &pImageFormatProperties->imageFormatProperties);
    return VK_SUCCESS;
"#,
    ),
    (
        "vkGetPhysicalDeviceProperties",
        r#"    pProperties->apiVersion = VK_API_VERSION_1_0;
    pProperties->driverVersion = 1;
    pProperties->vendorID = 0xba5eba11;
    pProperties->deviceID = 0xf005ba11;
    pProperties->deviceType = VK_PHYSICAL_DEVICE_TYPE_VIRTUAL_GPU;
    strcpy(pProperties->deviceName, "Vulkan Mock Device");
    pProperties->pipelineCacheUUID[0] = 18;
    pProperties->limits = SetLimits(&pProperties->limits);
    pProperties->sparseProperties = { VK_TRUE, VK_TRUE, VK_TRUE, VK_TRUE, VK_TRUE };
"#,
    ),
    (
        "vkGetPhysicalDeviceProperties2",
        r#"    GetPhysicalDeviceProperties(physicalDevice, &pProperties->properties);
"#,
    ),
    (
        "vkGetPhysicalDeviceProperties2KHR",
        r#"    GetPhysicalDeviceProperties(physicalDevice, &pProperties->properties);
"#,
    ),
    (
        "vkGetBufferMemoryRequirements",
        r#"    pMemoryRequirements->size = 4096;
    pMemoryRequirements->alignment = 1;
    pMemoryRequirements->memoryTypeBits = 0xFFFF;
"#,
    ),
    (
        "vkGetBufferMemoryRequirements2",
        r#"    GetBufferMemoryRequirements(device, pInfo->buffer, &pMemoryRequirements->memoryRequirements);
"#,
    ),
    (
        "vkGetBufferMemoryRequirements2KHR",
        r#"    GetBufferMemoryRequirements(device, pInfo->buffer, &pMemoryRequirements->memoryRequirements);
"#,
    ),
    (
        "vkGetImageMemoryRequirements",
        r#"    pMemoryRequirements->size = 4096;
    pMemoryRequirements->alignment = 1;
    pMemoryRequirements->memoryTypeBits = 0xFFFF;
"#,
    ),
    (
        "vkGetImageMemoryRequirements2",
        r#"    GetImageMemoryRequirements(device, pInfo->image, &pMemoryRequirements->memoryRequirements);
"#,
    ),
    (
        "vkGetImageMemoryRequirements2KHR",
        r#"    GetImageMemoryRequirements(device, pInfo->image, &pMemoryRequirements->memoryRequirements);
"#,
    ),
    (
        "vkMapMemory",
        r#"    unique_lock_t lock(global_lock);
    if (VK_WHOLE_SIZE == size) {
        size = 0x10000;
    }
    void* map_addr = malloc((size_t)size);
    mapped_memory_map[memory].push_back(map_addr);
    *ppData = map_addr;
    return VK_SUCCESS;
"#,
    ),
    (
        "vkUnmapMemory",
        r#"    unique_lock_t lock(global_lock);
    for (auto map_addr : mapped_memory_map[memory]) {
        free(map_addr);
    }
    mapped_memory_map.erase(memory);
"#,
    ),
    (
        "vkGetImageSubresourceLayout",
        r#"    // Callers derive memory offsets from the layout without a result code, so zero it.
    *pLayout = VkSubresourceLayout();
"#,
    ),
];
