//! Processor attribute tables.
//!
//! Processor attributes of a context are passed to the toolchain
//! configuration as CMake variables. Unknown attribute values are dropped.

use crate::core::cbuild::Processor;

fn fpu(value: &str) -> Option<&'static str> {
    match value {
        "dp" => Some("DP_FPU"),
        "sp" => Some("SP_FPU"),
        "off" => Some("NO_FPU"),
        _ => None,
    }
}

fn dsp(value: &str) -> Option<&'static str> {
    match value {
        "on" => Some("DSP"),
        "off" => Some("NO_DSP"),
        _ => None,
    }
}

fn secure(value: &str) -> Option<&'static str> {
    match value {
        "secure" => Some("Secure"),
        "non-secure" => Some("Non-secure"),
        _ => None,
    }
}

fn mve(value: &str) -> Option<&'static str> {
    match value {
        "fp" => Some("FP_FVE"),
        "int" => Some("MVE"),
        "off" => Some("NO_MVE"),
        _ => None,
    }
}

fn branch_protection(value: &str) -> Option<&'static str> {
    match value {
        "bti" => Some("BTI"),
        "bti-signret" => Some("BTI_SIGNRET"),
        "off" => Some("NO_BRANCHPROT"),
        _ => None,
    }
}

fn byte_order(value: &str) -> Option<&'static str> {
    match value {
        "big" => Some("Big-endian"),
        "little" => Some("Little-endian"),
        _ => None,
    }
}

/// `(variable, value)` pairs describing the processor, `CPU` first.
pub fn processor_variables(processor: &Processor) -> Vec<(&'static str, String)> {
    let mut variables = vec![("CPU", processor.core.clone())];
    let table = [
        ("FPU", fpu(&processor.fpu)),
        ("DSP", dsp(&processor.dsp)),
        ("SECURE", secure(&processor.trustzone)),
        ("MVE", mve(&processor.mve)),
        ("BRANCHPROT", branch_protection(&processor.branch_protection)),
        ("BYTE_ORDER", byte_order(&processor.endian)),
    ];
    for (variable, value) in table {
        if let Some(value) = value {
            variables.push((variable, value.to_string()));
        }
    }
    variables
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processor_variables() {
        let processor = Processor {
            core: "Cortex-M55".to_string(),
            fpu: "dp".to_string(),
            dsp: "on".to_string(),
            mve: "fp".to_string(),
            endian: "little".to_string(),
            trustzone: "secure".to_string(),
            branch_protection: "bti-signret".to_string(),
        };
        assert_eq!(
            processor_variables(&processor),
            vec![
                ("CPU", "Cortex-M55".to_string()),
                ("FPU", "DP_FPU".to_string()),
                ("DSP", "DSP".to_string()),
                ("SECURE", "Secure".to_string()),
                ("MVE", "FP_FVE".to_string()),
                ("BRANCHPROT", "BTI_SIGNRET".to_string()),
                ("BYTE_ORDER", "Little-endian".to_string()),
            ]
        );
    }

    #[test]
    fn test_unknown_values_are_dropped() {
        let processor = Processor {
            core: "Cortex-M0".to_string(),
            fpu: "half".to_string(),
            trustzone: "off".to_string(),
            ..Default::default()
        };
        assert_eq!(
            processor_variables(&processor),
            vec![("CPU", "Cortex-M0".to_string())]
        );
    }
}
