use roost_core::config::{BufferSpec, ConverterConfig};
use roost_core::id::ResourceKind;
use serde::{Deserialize, Serialize};

/// What a converter produces. Decides its buffer kind and size and which
/// crack outputs it recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConverterVariant {
    Power,
    Fluid,
    #[cfg(feature = "chemical")]
    Chemical,
}

impl ConverterVariant {
    pub fn kind(self) -> ResourceKind {
        match self {
            ConverterVariant::Power => ResourceKind::Energy,
            ConverterVariant::Fluid => ResourceKind::Fluid,
            #[cfg(feature = "chemical")]
            ConverterVariant::Chemical => ResourceKind::Chemical,
        }
    }

    pub fn buffer_spec(self, config: &ConverterConfig) -> BufferSpec {
        match self {
            ConverterVariant::Power => config.power,
            ConverterVariant::Fluid => config.fluid,
            #[cfg(feature = "chemical")]
            ConverterVariant::Chemical => config.chemical,
        }
    }
}
