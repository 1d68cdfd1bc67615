//! Interface, method and signal descriptors.
//!
//! Descriptors are schema only: names plus ordered argument signatures. They
//! are built once (by registration or by an introspection parser) and never
//! mutated afterwards, except through [`InterfaceTable`] while a type is still
//! being defined.
//!
//! [`InterfaceTable`]: crate::InterfaceTable

use crate::{
    error::NameError,
    name::{validate_interface_name, validate_member_name},
};
use std::{collections::BTreeMap, fmt::Write};

/// A formal parameter: optional name plus a single complete signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    /// Parameter name, if declared.
    pub name: Option<String>,
    /// Signature of the parameter.
    pub signature: String,
}

impl Arg {
    /// A named parameter.
    pub fn new(name: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            signature: signature.into(),
        }
    }

    /// An unnamed parameter.
    pub fn unnamed(signature: impl Into<String>) -> Self {
        Self {
            name: None,
            signature: signature.into(),
        }
    }

    fn write_xml(&self, out: &mut String, direction: Option<&str>) {
        out.push_str("      <arg");
        if let Some(name) = &self.name {
            let _ = write!(out, " name=\"{}\"", escape(name));
        }
        if let Some(direction) = direction {
            let _ = write!(out, " direction=\"{direction}\"");
        }
        let _ = writeln!(out, " type=\"{}\"/>", escape(&self.signature));
    }
}

/// A method: name, ordered inputs, ordered outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    name: String,
    inputs: Vec<Arg>,
    outputs: Vec<Arg>,
}

impl Method {
    /// A method with no parameters.
    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        validate_member_name(&name)?;
        Ok(Self {
            name,
            inputs: Vec::new(),
            outputs: Vec::new(),
        })
    }

    /// A method from lists of unnamed input and output signatures.
    pub fn from_signatures(
        name: impl Into<String>,
        inputs: &[&str],
        outputs: &[&str],
    ) -> Result<Self, NameError> {
        Ok(Self {
            inputs: inputs.iter().copied().map(Arg::unnamed).collect(),
            outputs: outputs.iter().copied().map(Arg::unnamed).collect(),
            ..Self::new(name)?
        })
    }

    /// A method from a prototype such as `"in name:s, in count:u, out ok:b"`.
    ///
    /// Each comma-separated entry is `in|out name:signature`; the name may be
    /// omitted (`out :b`). An empty prototype declares no parameters.
    pub fn from_prototype(name: impl Into<String>, prototype: &str) -> Result<Self, NameError> {
        let mut method = Self::new(name)?;
        let bad = || NameError::Prototype(prototype.to_owned());

        for entry in prototype.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (direction, param) = entry.split_once(char::is_whitespace).ok_or_else(bad)?;
            let (param_name, signature) = param.trim().split_once(':').ok_or_else(bad)?;
            if signature.is_empty() {
                return Err(bad());
            }
            let arg = match param_name {
                "" => Arg::unnamed(signature),
                named => Arg::new(named, signature),
            };
            match direction {
                "in" => method.inputs.push(arg),
                "out" => method.outputs.push(arg),
                _ => return Err(bad()),
            }
        }
        Ok(method)
    }

    /// Append an input parameter.
    pub fn with_input(mut self, arg: Arg) -> Self {
        self.inputs.push(arg);
        self
    }

    /// Append an output parameter.
    pub fn with_output(mut self, arg: Arg) -> Self {
        self.outputs.push(arg);
        self
    }

    /// Method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered input parameters.
    pub fn inputs(&self) -> &[Arg] {
        &self.inputs
    }

    /// Ordered output parameters.
    pub fn outputs(&self) -> &[Arg] {
        &self.outputs
    }

    /// Concatenated input signature.
    pub fn input_signature(&self) -> String {
        self.inputs.iter().map(|a| a.signature.as_str()).collect()
    }

    /// Concatenated output signature.
    pub fn output_signature(&self) -> String {
        self.outputs.iter().map(|a| a.signature.as_str()).collect()
    }

    fn write_xml(&self, out: &mut String) {
        let _ = writeln!(out, "    <method name=\"{}\">", self.name);
        for arg in &self.inputs {
            arg.write_xml(out, Some("in"));
        }
        for arg in &self.outputs {
            arg.write_xml(out, Some("out"));
        }
        out.push_str("    </method>\n");
    }
}

/// A signal: name and ordered parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    name: String,
    args: Vec<Arg>,
}

impl Signal {
    /// A signal with no parameters.
    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        validate_member_name(&name)?;
        Ok(Self {
            name,
            args: Vec::new(),
        })
    }

    /// A signal from a list of unnamed signatures.
    pub fn from_signatures(name: impl Into<String>, args: &[&str]) -> Result<Self, NameError> {
        Ok(Self {
            args: args.iter().copied().map(Arg::unnamed).collect(),
            ..Self::new(name)?
        })
    }

    /// Append a parameter.
    pub fn with_arg(mut self, arg: Arg) -> Self {
        self.args.push(arg);
        self
    }

    /// Signal name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered parameters.
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    fn write_xml(&self, out: &mut String) {
        let _ = writeln!(out, "    <signal name=\"{}\">", self.name);
        for arg in &self.args {
            arg.write_xml(out, None);
        }
        out.push_str("    </signal>\n");
    }
}

/// A named set of methods and signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    name: String,
    methods: BTreeMap<String, Method>,
    signals: BTreeMap<String, Signal>,
}

impl Interface {
    /// An empty interface.
    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        validate_interface_name(&name)?;
        Ok(Self {
            name,
            methods: BTreeMap::new(),
            signals: BTreeMap::new(),
        })
    }

    /// Add a method (builder form).
    pub fn with_method(mut self, method: Method) -> Self {
        self.add_method(method);
        self
    }

    /// Add a signal (builder form).
    pub fn with_signal(mut self, signal: Signal) -> Self {
        self.add_signal(signal);
        self
    }

    /// Add a method, replacing any method with the same name.
    pub fn add_method(&mut self, method: Method) -> Option<Method> {
        self.methods.insert(method.name.clone(), method)
    }

    /// Add a signal, replacing any signal with the same name.
    pub fn add_signal(&mut self, signal: Signal) -> Option<Signal> {
        self.signals.insert(signal.name.clone(), signal)
    }

    /// Interface name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a method.
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    /// Look up a signal.
    pub fn signal(&self, name: &str) -> Option<&Signal> {
        self.signals.get(name)
    }

    /// All methods, ordered by name.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.values()
    }

    /// All signals, ordered by name.
    pub fn signals(&self) -> impl Iterator<Item = &Signal> {
        self.signals.values()
    }

    /// Render as an introspection `<interface>` element.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }

    pub(crate) fn write_xml(&self, out: &mut String) {
        let _ = writeln!(out, "  <interface name=\"{}\">", self.name);
        for method in self.methods.values() {
            method.write_xml(out);
        }
        for signal in self.signals.values() {
            signal.write_xml(out);
        }
        out.push_str("  </interface>\n");
    }
}

pub(crate) fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prototype_parsing() {
        let method = Method::from_prototype("Add", "in a:i, in b:i, out sum:i").unwrap();
        assert_eq!(method.inputs(), [Arg::new("a", "i"), Arg::new("b", "i")]);
        assert_eq!(method.outputs(), [Arg::new("sum", "i")]);
        assert_eq!(method.input_signature(), "ii");

        let unnamed = Method::from_prototype("Get", "out :a{sv}").unwrap();
        assert_eq!(unnamed.outputs(), [Arg::unnamed("a{sv}")]);

        assert!(Method::from_prototype("Nop", "").unwrap().inputs().is_empty());
    }

    #[test]
    fn test_prototype_errors() {
        assert!(matches!(
            Method::from_prototype("Bad", "inout x:s"),
            Err(NameError::Prototype(_))
        ));
        assert!(Method::from_prototype("Bad", "in x").is_err());
        assert!(Method::from_prototype("Bad", "in x:").is_err());
        assert!(matches!(
            Method::from_prototype("1Bad", "in x:s"),
            Err(NameError::Member(_))
        ));
    }

    #[test]
    fn test_interface_lookup() {
        let iface = Interface::new("org.example.Player")
            .unwrap()
            .with_method(Method::from_signatures("Play", &["s"], &[]).unwrap())
            .with_signal(Signal::from_signatures("Stopped", &["u"]).unwrap());

        assert_eq!(iface.method("Play").unwrap().input_signature(), "s");
        assert!(iface.method("Stopped").is_none());
        assert_eq!(iface.signal("Stopped").unwrap().args().len(), 1);
        assert!(Interface::new("Player").is_err());
    }

    #[test]
    fn test_interface_xml() {
        let iface = Interface::new("org.example.Calc")
            .unwrap()
            .with_method(Method::from_prototype("Add", "in a:i, in b:i, out :i").unwrap())
            .with_signal(Signal::new("Reset").unwrap().with_arg(Arg::new("why", "s")));

        let xml = iface.to_xml();
        assert!(xml.starts_with("  <interface name=\"org.example.Calc\">\n"));
        assert!(xml.contains("<method name=\"Add\">"));
        assert!(xml.contains("<arg name=\"a\" direction=\"in\" type=\"i\"/>"));
        assert!(xml.contains("<arg direction=\"out\" type=\"i\"/>"));
        assert!(xml.contains("<signal name=\"Reset\">"));
        assert!(xml.contains("<arg name=\"why\" type=\"s\"/>"));
        assert!(xml.ends_with("  </interface>\n"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}
