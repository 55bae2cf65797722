//! MEMORY_BASIC_INFORMATION conversion

use crate::core::types::{Address, RegionInfo};
use winapi::um::winnt::MEMORY_BASIC_INFORMATION;

impl From<MEMORY_BASIC_INFORMATION> for RegionInfo {
    fn from(mbi: MEMORY_BASIC_INFORMATION) -> Self {
        RegionInfo {
            base_address: Address::new(mbi.BaseAddress as usize),
            size: mbi.RegionSize,
            protection: mbi.Protect,
            state: mbi.State,
            region_type: mbi.Type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::flags::{MEM_COMMIT, MEM_IMAGE, PAGE_EXECUTE_READ};

    #[test]
    fn test_from_memory_basic_information() {
        let mut mbi: MEMORY_BASIC_INFORMATION = unsafe { std::mem::zeroed() };
        mbi.BaseAddress = 0x2000 as *mut _;
        mbi.AllocationBase = 0x1000 as *mut _;
        mbi.RegionSize = 8192;
        mbi.State = MEM_COMMIT;
        mbi.Protect = PAGE_EXECUTE_READ;
        mbi.Type = MEM_IMAGE;

        let info = RegionInfo::from(mbi);
        assert_eq!(info.base_address, Address::new(0x2000));
        assert_eq!(info.size, 8192);
        assert!(info.is_readable());
        assert!(info.is_executable());
        assert_eq!(info.region_type, MEM_IMAGE);
    }
}
