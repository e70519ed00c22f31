//! Node types command - list the standard computations.

use anyhow::Result;
use nodeflow_core::flow::InputPort;
use nodeflow_core::ComputationInfo;
use nodeflow_nodes::standard_registry;

fn describe_input(name: &str, port: &InputPort) -> String {
    let mut text = format!("{name}: {}", port.port_type);
    if port.multi {
        text.push_str(" (multi)");
    }
    if !port.required {
        text.push_str(" (optional)");
    }
    text
}

fn describe(info: &ComputationInfo) -> Vec<String> {
    let inputs: Vec<String> = info
        .inputs
        .iter()
        .map(|(name, port)| describe_input(name, port))
        .collect();
    let outputs: Vec<String> = info
        .outputs
        .iter()
        .map(|(name, port_type)| format!("{name}: {port_type}"))
        .collect();

    vec![
        info.name.clone(),
        format!("    {}", info.description),
        format!("    inputs:  {}", if inputs.is_empty() { "-".to_string() } else { inputs.join(", ") }),
        format!("    outputs: {}", if outputs.is_empty() { "-".to_string() } else { outputs.join(", ") }),
    ]
}

/// Run the node-types command.
pub fn run(json: bool) -> Result<()> {
    let infos = standard_registry().list();

    if json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    println!("Registered node types ({}):", infos.len());
    for info in &infos {
        println!();
        for line in describe(info) {
            println!("  {line}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodeflow_core::flow::PortType;

    #[test]
    fn describes_ports() {
        let info = ComputationInfo::new("math", "add")
            .with_description("sum")
            .with_input("in", InputPort::new(PortType::Number).multi())
            .with_output("out", PortType::Number);

        let lines = describe(&info);
        assert_eq!(lines[0], "math::add");
        assert_eq!(lines[2], "    inputs:  in: number (multi)");
        assert_eq!(lines[3], "    outputs: out: number");
    }

    #[test]
    fn sink_has_no_outputs() {
        let registry = standard_registry();
        let sink = registry.list().into_iter().find(|i| i.name == "std::data_sink").unwrap();
        assert_eq!(describe(&sink)[3], "    outputs: -");
    }
}
