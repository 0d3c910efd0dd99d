//! Minimal JVM class-file reader.
//!
//! Only the parts needed to answer "does this class declare member X" are
//! decoded: the constant pool, access flags and the field and method tables.
//! Attributes are skipped by length.

use thiserror::Error;

const MAGIC: u32 = 0xCAFE_BABE;

/// `ACC_STATIC` access flag.
pub const ACC_STATIC: u16 = 0x0008;
/// `ACC_INTERFACE` access flag.
pub const ACC_INTERFACE: u16 = 0x0200;
/// `ACC_ABSTRACT` access flag.
pub const ACC_ABSTRACT: u16 = 0x0400;

/// Decoding failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassFileError {
    #[error("class file truncated at offset {0}")]
    Truncated(usize),
    #[error("bad magic {0:#010x}")]
    BadMagic(u32),
    #[error("unknown constant pool tag {tag} at index {index}")]
    UnknownTag { tag: u8, index: u16 },
    #[error("constant pool index {0} is not a UTF-8 entry")]
    NotUtf8(u16),
    #[error("long or double constant at index {0} runs past the end of the pool")]
    WideConstantOverrun(u16),
}

/// A declared field or method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub access: u16,
    pub name: String,
    pub descriptor: String,
}

impl MemberInfo {
    pub fn is_static(&self) -> bool {
        self.access & ACC_STATIC != 0
    }
}

/// Decoded class structure.
#[derive(Debug, Clone)]
pub struct ClassInfo {
    pub access: u16,
    pub major_version: u16,
    pub fields: Vec<MemberInfo>,
    pub methods: Vec<MemberInfo>,
}

impl ClassInfo {
    /// Whether instances of the class can be created.
    pub fn is_concrete(&self) -> bool {
        self.access & (ACC_INTERFACE | ACC_ABSTRACT) == 0
    }

    /// First method with `name`, optionally matching `descriptor` exactly.
    pub fn method(&self, name: &str, descriptor: Option<&str>) -> Option<&MemberInfo> {
        find_member(&self.methods, name, descriptor)
    }

    /// First field with `name`, optionally matching `descriptor` exactly.
    pub fn field(&self, name: &str, descriptor: Option<&str>) -> Option<&MemberInfo> {
        find_member(&self.fields, name, descriptor)
    }
}

fn find_member<'a>(
    members: &'a [MemberInfo],
    name: &str,
    descriptor: Option<&str>,
) -> Option<&'a MemberInfo> {
    members
        .iter()
        .find(|m| m.name == name && descriptor.is_none_or(|d| m.descriptor == d))
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], ClassFileError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(ClassFileError::Truncated(self.pos))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, ClassFileError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, ClassFileError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, ClassFileError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}

/// Parses a class file.
pub fn parse(bytes: &[u8]) -> Result<ClassInfo, ClassFileError> {
    let mut r = Reader { bytes, pos: 0 };

    let magic = r.u32()?;
    if magic != MAGIC {
        return Err(ClassFileError::BadMagic(magic));
    }
    let _minor = r.u16()?;
    let major_version = r.u16()?;

    // Index 0 is unused; only UTF-8 entries are kept.
    let count = r.u16()?;
    let mut utf8: Vec<Option<String>> = vec![None; count as usize];
    // Wider than the pool count so the two-slot step cannot wrap
    let mut index = 1u32;
    while index < u32::from(count) {
        let slot = index as u16;
        let tag = r.u8()?;
        match tag {
            1 => {
                let len = r.u16()? as usize;
                utf8[slot as usize] = Some(String::from_utf8_lossy(r.take(len)?).into_owned());
            }
            7 | 8 | 16 | 19 | 20 => {
                r.take(2)?;
            }
            15 => {
                r.take(3)?;
            }
            3 | 4 | 9 | 10 | 11 | 12 | 17 | 18 => {
                r.take(4)?;
            }
            5 | 6 => {
                // Long and double occupy two slots
                if index + 1 >= u32::from(count) {
                    return Err(ClassFileError::WideConstantOverrun(slot));
                }
                r.take(8)?;
                index += 1;
            }
            _ => return Err(ClassFileError::UnknownTag { tag, index: slot }),
        }
        index += 1;
    }

    let name_at = |idx: u16| -> Result<String, ClassFileError> {
        utf8.get(idx as usize)
            .and_then(|e| e.clone())
            .ok_or(ClassFileError::NotUtf8(idx))
    };

    let access = r.u16()?;
    let _this_class = r.u16()?;
    let _super_class = r.u16()?;
    let interfaces = r.u16()? as usize;
    r.take(interfaces * 2)?;

    let read_members = |r: &mut Reader<'_>| -> Result<Vec<MemberInfo>, ClassFileError> {
        let n = r.u16()?;
        let mut members = Vec::with_capacity(n as usize);
        for _ in 0..n {
            let access = r.u16()?;
            let name = name_at(r.u16()?)?;
            let descriptor = name_at(r.u16()?)?;
            let attributes = r.u16()?;
            for _ in 0..attributes {
                let _name = r.u16()?;
                let len = r.u32()? as usize;
                r.take(len)?;
            }
            members.push(MemberInfo {
                access,
                name,
                descriptor,
            });
        }
        Ok(members)
    };

    let fields = read_members(&mut r)?;
    let methods = read_members(&mut r)?;

    Ok(ClassInfo {
        access,
        major_version,
        fields,
        methods,
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    const MAIN: &str = "([Ljava/lang/String;)V";

    #[test]
    fn parses_members() {
        let bytes = synth::class_bytes(
            0x0021,
            "com.sun.javafx.tools.packager.Main",
            &[(0x0019, "VERSION", "Ljava/lang/String;")],
            &[(0x0001, "<init>", "()V"), (0x0009, "main", MAIN)],
        );
        let class = parse(&bytes).unwrap();
        assert!(class.is_concrete());
        assert_eq!(class.major_version, 52);
        assert!(class.method("main", Some(MAIN)).unwrap().is_static());
        assert!(class.method("main", Some("()V")).is_none());
        assert!(class.method("<init>", None).is_some());
        assert!(class.field("VERSION", None).is_some());
        assert!(class.field("main", None).is_none());
    }

    #[test]
    fn rejects_bad_magic() {
        assert_eq!(
            parse(&[0, 0, 0, 1, 0, 0]).unwrap_err(),
            ClassFileError::BadMagic(1)
        );
    }

    #[test]
    fn reports_truncation() {
        let bytes = synth::class_bytes(0x0021, "a.B", &[], &[(0x0009, "main", MAIN)]);
        let cut = &bytes[..bytes.len() - 5];
        assert!(matches!(parse(cut), Err(ClassFileError::Truncated(_))));
    }

    /// Header and a constant pool of `count` slots holding `integers`
    /// integer constants followed by one long.
    fn pool_ending_in_long(count: u16, integers: usize) -> Vec<u8> {
        let mut bytes = 0xCAFE_BABEu32.to_be_bytes().to_vec();
        bytes.extend_from_slice(&[0, 0, 0, 52]);
        bytes.extend_from_slice(&count.to_be_bytes());
        for _ in 0..integers {
            bytes.extend_from_slice(&[3, 0, 0, 0, 7]);
        }
        bytes.extend_from_slice(&[5, 0, 0, 0, 0, 0, 0, 0, 1]);
        bytes
    }

    #[test]
    fn long_in_last_slot_of_full_pool_is_an_error() {
        let bytes = pool_ending_in_long(u16::MAX, usize::from(u16::MAX) - 2);
        assert_eq!(
            parse(&bytes).unwrap_err(),
            ClassFileError::WideConstantOverrun(u16::MAX - 1)
        );
    }

    #[test]
    fn long_in_last_slot_of_small_pool_is_an_error() {
        let bytes = pool_ending_in_long(4, 2);
        assert_eq!(parse(&bytes).unwrap_err(), ClassFileError::WideConstantOverrun(3));
    }

    #[test]
    fn abstract_classes_are_not_concrete() {
        let bytes = synth::class_bytes(0x0421, "a.Base", &[], &[]);
        assert!(!parse(&bytes).unwrap().is_concrete());
    }
}
