//! Assembler macro injection.
//!
//! Assembly sources processed by the toolchain's assembler directly (not by
//! the C preprocessor) cannot take `-D` definitions. For AC6 and GCC their
//! definitions are passed as assembler symbols instead.

use crate::core::define::Define;
use crate::util::list::find_last;

/// Assembler dialect selecting the symbol definition flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsmSyntax {
    /// `--defsym NAME=VALUE`
    Gnu,
    /// armasm `--pd "NAME SETA VALUE"`
    Arm,
}

/// Dialect for `file`, or `None` when plain compile definitions apply.
///
/// `misc_asm` is the inherited ASM misc chain; for AC6 its last `-masm`
/// flag decides the dialect.
pub fn asm_syntax(toolchain: &str, file: &str, misc_asm: &[String]) -> Option<AsmSyntax> {
    if file.ends_with(".S") {
        return None;
    }
    match toolchain {
        "GCC" => Some(AsmSyntax::Gnu),
        "AC6" => match find_last(misc_asm, "-masm") {
            Some("-masm=gnu") | Some("-masm=auto") => Some(AsmSyntax::Gnu),
            _ => Some(AsmSyntax::Arm),
        },
        _ => None,
    }
}

/// Assembler flags defining every symbol in `defines`.
///
/// A definition without value is defined as `1`.
pub fn asm_define_flags(syntax: AsmSyntax, defines: &[Define]) -> Vec<String> {
    defines
        .iter()
        .map(|define| {
            let value = match define.value_or_empty() {
                "" => "1",
                value => value,
            };
            match syntax {
                AsmSyntax::Gnu => format!("-Wa,--defsym,{}={}", define.name, value),
                AsmSyntax::Arm => format!("-Wa,armasm,--pd,{} SETA {}", define.name, value),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_asm_syntax_selection() {
        assert_eq!(asm_syntax("GCC", "startup.s", &[]), Some(AsmSyntax::Gnu));
        assert_eq!(asm_syntax("AC6", "startup.s", &[]), Some(AsmSyntax::Arm));
        assert_eq!(
            asm_syntax("AC6", "startup.s", &strings(&["-masm=armasm", "-masm=gnu"])),
            Some(AsmSyntax::Gnu)
        );
        assert_eq!(
            asm_syntax("AC6", "startup.s", &strings(&["-masm=auto", "-masm=armasm"])),
            Some(AsmSyntax::Arm)
        );
        assert_eq!(
            asm_syntax("AC6", "startup.asm", &strings(&["-masm=auto"])),
            Some(AsmSyntax::Gnu)
        );
        assert_eq!(asm_syntax("GCC", "startup.S", &[]), None);
        assert_eq!(asm_syntax("IAR", "startup.s", &[]), None);
        assert_eq!(asm_syntax("CLANG", "startup.s", &[]), None);
    }

    #[test]
    fn test_asm_define_flags() {
        let defines = vec![Define::new("FLAG"), Define::with_value("STACK", "0x400")];
        assert_eq!(
            asm_define_flags(AsmSyntax::Gnu, &defines),
            vec!["-Wa,--defsym,FLAG=1", "-Wa,--defsym,STACK=0x400"]
        );
        assert_eq!(
            asm_define_flags(AsmSyntax::Arm, &defines),
            vec!["-Wa,armasm,--pd,FLAG SETA 1", "-Wa,armasm,--pd,STACK SETA 0x400"]
        );
    }
}
