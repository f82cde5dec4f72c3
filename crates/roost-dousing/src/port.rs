use roost_core::buffer::{Action, ResourceBuffer, ResourceStack};
use roost_core::id::{ResourceKind, ResourceTypeId};
use roost_core::transfer::ResourceHandler;

/// The fluid buffer as neighbors see it. Refuses fills while the special
/// buffer holds anything; the two never hold content at the same time.
#[derive(Debug)]
pub struct FluidPort<'a> {
    pub fluid: &'a mut ResourceBuffer,
    pub special: &'a ResourceBuffer,
}

impl ResourceHandler for FluidPort<'_> {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Fluid
    }

    fn stored(&self) -> Option<ResourceStack> {
        self.fluid.stored()
    }

    fn capacity(&self) -> u32 {
        self.fluid.capacity()
    }

    fn fill(&mut self, resource: ResourceTypeId, amount: u32, action: Action) -> u32 {
        if !self.special.is_empty() {
            return 0;
        }
        self.fluid.fill(resource, amount, action)
    }

    fn drain(&mut self, amount: u32, action: Action) -> u32 {
        self.fluid.drain(amount, action)
    }
}
