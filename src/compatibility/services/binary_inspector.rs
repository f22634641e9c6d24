use crate::compatibility::domain::{BinaryCheck, TargetArchitecture};
use goblin::elf::header::{EM_AARCH64, EM_X86_64};
use goblin::mach::Mach;
use goblin::Object;

const MACH_CPU_TYPE_X86_64: u32 = 0x0100_0007;
const MACH_CPU_TYPE_ARM64: u32 = 0x0100_000c;
const PE_MACHINE_AMD64: u16 = 0x8664;
const PE_MACHINE_ARM64: u16 = 0xaa64;

/// Architecture read from a binary header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedArch {
    Arm64,
    X86_64,
    Other,
}

impl DetectedArch {
    fn is_target(&self, target: TargetArchitecture) -> bool {
        matches!(
            (self, target),
            (DetectedArch::Arm64, TargetArchitecture::Arm64)
                | (DetectedArch::X86_64, TargetArchitecture::X86_64)
        )
    }
}

/// BinaryInspector - reads architecture markers from compiled artifacts
///
/// ELF `e_machine`, every slice of a Mach-O (fat/universal) binary, and the
/// PE/COFF machine field.
pub struct BinaryInspector;

impl BinaryInspector {
    /// Architectures declared by one binary. `None` if it cannot be parsed.
    pub fn architectures(bytes: &[u8]) -> Option<Vec<DetectedArch>> {
        match Object::parse(bytes).ok()? {
            Object::Elf(elf) => Some(vec![from_elf_machine(elf.header.e_machine)]),
            Object::Mach(Mach::Binary(macho)) => {
                Some(vec![from_mach_cputype(macho.header.cputype)])
            }
            Object::Mach(Mach::Fat(multi)) => {
                let arches: Vec<DetectedArch> = multi
                    .iter_arches()
                    .filter_map(|arch| arch.ok())
                    .map(|arch| from_mach_cputype(arch.cputype))
                    .collect();
                (!arches.is_empty()).then_some(arches)
            }
            Object::PE(pe) => Some(vec![from_pe_machine(pe.header.coff_header.machine)]),
            _ => None,
        }
    }

    /// Folds every artifact of one install into a single verdict.
    ///
    /// A universal binary counts as target-compatible when any of its slices
    /// is for the target.
    pub fn inspect<'a, I>(target: TargetArchitecture, binaries: I) -> BinaryCheck
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut seen_any = false;
        let mut parsed_any = false;

        for bytes in binaries {
            seen_any = true;
            let Some(arches) = Self::architectures(bytes) else {
                continue;
            };
            parsed_any = true;
            if arches.iter().any(|arch| arch.is_target(target)) {
                return BinaryCheck::TargetCompatible;
            }
        }

        match (seen_any, parsed_any) {
            (false, _) => BinaryCheck::NoNativeBinaries,
            (true, true) => BinaryCheck::ForeignOnly,
            (true, false) => BinaryCheck::Unreadable,
        }
    }
}

fn from_elf_machine(machine: u16) -> DetectedArch {
    match machine {
        EM_AARCH64 => DetectedArch::Arm64,
        EM_X86_64 => DetectedArch::X86_64,
        _ => DetectedArch::Other,
    }
}

fn from_mach_cputype(cputype: u32) -> DetectedArch {
    match cputype {
        MACH_CPU_TYPE_ARM64 => DetectedArch::Arm64,
        MACH_CPU_TYPE_X86_64 => DetectedArch::X86_64,
        _ => DetectedArch::Other,
    }
}

fn from_pe_machine(machine: u16) -> DetectedArch {
    match machine {
        PE_MACHINE_ARM64 => DetectedArch::Arm64,
        PE_MACHINE_AMD64 => DetectedArch::X86_64,
        _ => DetectedArch::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal 64-bit little-endian ELF shared object header
    fn elf_header(machine: u16) -> Vec<u8> {
        let mut bytes = vec![0x7f, b'E', b'L', b'F', 2, 1, 1, 0];
        bytes.extend_from_slice(&[0; 8]);
        bytes.extend_from_slice(&3u16.to_le_bytes()); // e_type ET_DYN
        bytes.extend_from_slice(&machine.to_le_bytes());
        bytes.extend_from_slice(&1u32.to_le_bytes()); // e_version
        bytes.extend_from_slice(&0u64.to_le_bytes()); // e_entry
        bytes.extend_from_slice(&0u64.to_le_bytes()); // e_phoff
        bytes.extend_from_slice(&0u64.to_le_bytes()); // e_shoff
        bytes.extend_from_slice(&0u32.to_le_bytes()); // e_flags
        bytes.extend_from_slice(&64u16.to_le_bytes()); // e_ehsize
        bytes.extend_from_slice(&56u16.to_le_bytes()); // e_phentsize
        bytes.extend_from_slice(&0u16.to_le_bytes()); // e_phnum
        bytes.extend_from_slice(&64u16.to_le_bytes()); // e_shentsize
        bytes.extend_from_slice(&0u16.to_le_bytes()); // e_shnum
        bytes.extend_from_slice(&0u16.to_le_bytes()); // e_shstrndx
        bytes
    }

    /// Minimal thin 64-bit Mach-O header with no load commands
    fn macho_header(cputype: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0xfeed_facfu32.to_le_bytes());
        bytes.extend_from_slice(&cputype.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes()); // cpusubtype
        bytes.extend_from_slice(&6u32.to_le_bytes()); // MH_DYLIB
        bytes.extend_from_slice(&0u32.to_le_bytes()); // ncmds
        bytes.extend_from_slice(&0u32.to_le_bytes()); // sizeofcmds
        bytes.extend_from_slice(&0u32.to_le_bytes()); // flags
        bytes.extend_from_slice(&0u32.to_le_bytes()); // reserved
        bytes
    }

    #[test]
    fn test_elf_machine_detection() {
        assert_eq!(
            BinaryInspector::architectures(&elf_header(EM_AARCH64)),
            Some(vec![DetectedArch::Arm64])
        );
        assert_eq!(
            BinaryInspector::architectures(&elf_header(EM_X86_64)),
            Some(vec![DetectedArch::X86_64])
        );
    }

    #[test]
    fn test_macho_cputype_detection() {
        assert_eq!(
            BinaryInspector::architectures(&macho_header(MACH_CPU_TYPE_ARM64)),
            Some(vec![DetectedArch::Arm64])
        );
    }

    #[test]
    fn test_garbage_is_unparseable() {
        assert_eq!(BinaryInspector::architectures(b"not a binary at all"), None);
    }

    #[test]
    fn test_inspect_verdicts() {
        let arm = elf_header(EM_AARCH64);
        let x86 = elf_header(EM_X86_64);
        let target = TargetArchitecture::Arm64;

        assert_eq!(
            BinaryInspector::inspect(target, std::iter::empty()),
            BinaryCheck::NoNativeBinaries
        );
        assert_eq!(
            BinaryInspector::inspect(target, [x86.as_slice(), arm.as_slice()]),
            BinaryCheck::TargetCompatible
        );
        assert_eq!(
            BinaryInspector::inspect(target, [x86.as_slice()]),
            BinaryCheck::ForeignOnly
        );
        assert_eq!(
            BinaryInspector::inspect(target, [b"garbage".as_slice()]),
            BinaryCheck::Unreadable
        );
        assert_eq!(
            BinaryInspector::inspect(TargetArchitecture::X86_64, [x86.as_slice()]),
            BinaryCheck::TargetCompatible
        );
    }
}
