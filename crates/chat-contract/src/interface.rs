//! Contract interface descriptions read from JSON ABI.

use std::collections::HashMap;

use chain_eth::abi::{function_selector, ParamType};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ContractError;

/// How a function interacts with contract state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    Nonpayable,
    Payable,
}

impl StateMutability {
    /// Queries run as `eth_call`; everything else is a transaction.
    pub fn is_query(self) -> bool {
        matches!(self, Self::Pure | Self::View)
    }
}

/// A callable contract function.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub inputs: Vec<ParamType>,
    pub outputs: Vec<ParamType>,
    pub state_mutability: StateMutability,
}

impl Function {
    /// Canonical signature, e.g. `sendMessage(address,string)`.
    pub fn signature(&self) -> String {
        let inputs: Vec<String> = self.inputs.iter().map(ParamType::canonical).collect();
        format!("{}({})", self.name, inputs.join(","))
    }

    pub fn selector(&self) -> [u8; 4] {
        function_selector(&self.signature())
    }

    pub fn is_query(&self) -> bool {
        self.state_mutability.is_query()
    }
}

/// The functions of one contract, looked up by name.
#[derive(Debug, Clone, Default)]
pub struct ContractInterface {
    functions: HashMap<String, Function>,
}

#[derive(Deserialize)]
struct AbiItem {
    #[serde(rename = "type", default = "default_item_type")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<AbiParam>,
    #[serde(default)]
    outputs: Vec<AbiParam>,
    #[serde(rename = "stateMutability")]
    state_mutability: Option<StateMutability>,
    /// Pre-0.6 ABIs flag queries with `constant` instead.
    #[serde(default)]
    constant: bool,
}

#[derive(Deserialize)]
struct AbiParam {
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    components: Vec<AbiParam>,
}

fn default_item_type() -> String {
    "function".into()
}

impl AbiParam {
    /// Resolves `tuple` types through their components.
    fn param_type(&self) -> Result<ParamType, ContractError> {
        if let Some(suffix) = self.ty.strip_prefix("tuple") {
            let members = self
                .components
                .iter()
                .map(Self::param_type)
                .collect::<Result<Vec<_>, _>>()?;
            let tuple = ParamType::Tuple(members).canonical();
            return Ok(ParamType::parse(&format!("{tuple}{suffix}"))?);
        }
        Ok(ParamType::parse(&self.ty)?)
    }
}

impl ContractInterface {
    /// Parses a bare ABI array or a Hardhat artifact with an `abi` field.
    pub fn from_json(json: &str) -> Result<Self, ContractError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| ContractError::InvalidInterface(format!("invalid JSON: {e}")))?;
        let abi = match value {
            Value::Array(_) => value,
            Value::Object(mut object) => object
                .remove("abi")
                .ok_or_else(|| ContractError::InvalidInterface("artifact has no `abi` field".into()))?,
            _ => {
                return Err(ContractError::InvalidInterface(
                    "expected an ABI array or an artifact object".into(),
                ))
            }
        };
        let items: Vec<AbiItem> = serde_json::from_value(abi)
            .map_err(|e| ContractError::InvalidInterface(format!("malformed ABI entry: {e}")))?;

        let mut functions = HashMap::new();
        for item in items.into_iter().filter(|i| i.kind == "function") {
            let state_mutability = match (item.state_mutability, item.constant) {
                (Some(m), _) => m,
                (None, true) => StateMutability::View,
                (None, false) => StateMutability::Nonpayable,
            };
            let function = Function {
                name: item.name.clone(),
                inputs: item
                    .inputs
                    .iter()
                    .map(AbiParam::param_type)
                    .collect::<Result<_, _>>()?,
                outputs: item
                    .outputs
                    .iter()
                    .map(AbiParam::param_type)
                    .collect::<Result<_, _>>()?,
                state_mutability,
            };
            if functions.contains_key(&item.name) {
                return Err(ContractError::InvalidInterface(format!(
                    "overloaded function `{}` is not supported",
                    item.name
                )));
            }
            functions.insert(item.name, function);
        }

        Ok(Self { functions })
    }

    /// Looks up a function by name.
    pub fn function(&self, name: &str) -> Result<&Function, ContractError> {
        self.functions
            .get(name)
            .ok_or_else(|| ContractError::UnknownFunction(name.to_string()))
    }

    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
