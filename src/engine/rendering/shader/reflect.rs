//! Builds the named constant table of a compiled stage from its naga IR.

use naga::{AddressSpace, Handle, Module, ScalarKind, Type, TypeInner};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ConstantKind {
    Float,
    Int,
    Uint,
    Sampler,
}

/// A resolved constant slot. Index into the program's [`UniformTable`],
/// or [`ConstantId::INVALID`] when a name did not resolve.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ConstantId(pub i32);

impl ConstantId {
    pub const INVALID: ConstantId = ConstantId(-1);

    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }

    pub fn index(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

/// A uniform buffer binding and the number of bytes it spans.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformBlock {
    pub group: u32,
    pub binding: u32,
    pub size: u32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformLocation {
    /// Bytes `offset..offset + size` of the uniform block at `block`.
    Buffer { block: usize, offset: u32, size: u32 },
    /// A texture or sampler binding.
    Binding { group: u32, binding: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct UniformEntry {
    pub name: String,
    pub location: UniformLocation,
    pub kind: ConstantKind,
}

/// Ordered constant table of a program. Names are unique and compared
/// case-sensitively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformTable {
    entries: Vec<UniformEntry>,
    blocks: Vec<UniformBlock>,
}

impl UniformTable {
    pub fn reflect(module: &Module) -> Self {
        let mut table = UniformTable::default();

        for (_, var) in module.global_variables.iter() {
            let Some(binding) = var.binding.as_ref() else {
                continue;
            };

            match var.space {
                AddressSpace::Uniform => {
                    let ty = &module.types[var.ty];
                    let size = ty.inner.size(module.to_ctx());
                    let block = table.add_block(UniformBlock {
                        group: binding.group,
                        binding: binding.binding,
                        size,
                    });
                    table.reflect_block(module, block, var.name.as_deref(), ty);
                }
                AddressSpace::Handle => {
                    if let Some(name) = var.name.clone() {
                        table.push(UniformEntry {
                            name,
                            location: UniformLocation::Binding {
                                group: binding.group,
                                binding: binding.binding,
                            },
                            kind: ConstantKind::Sampler,
                        });
                    }
                }
                _ => {}
            }
        }

        table
    }

    fn reflect_block(&mut self, module: &Module, block: usize, var_name: Option<&str>, ty: &Type) {
        match &ty.inner {
            TypeInner::Struct { members, span } => {
                for (i, member) in members.iter().enumerate() {
                    let end = members.get(i + 1).map_or(*span, |next| next.offset);
                    let (Some(name), Some(kind)) =
                        (member.name.clone(), scalar_kind(module, member.ty))
                    else {
                        continue;
                    };
                    self.push(UniformEntry {
                        name,
                        location: UniformLocation::Buffer {
                            block,
                            offset: member.offset,
                            size: end.saturating_sub(member.offset),
                        },
                        kind,
                    });
                }
            }
            inner => {
                let (Some(name), Some(kind)) = (var_name, kind_of(module, inner)) else {
                    return;
                };
                self.push(UniformEntry {
                    name: name.to_string(),
                    location: UniformLocation::Buffer {
                        block,
                        offset: 0,
                        size: inner.size(module.to_ctx()),
                    },
                    kind,
                });
            }
        }
    }

    fn add_block(&mut self, block: UniformBlock) -> usize {
        if let Some(i) = self
            .blocks
            .iter()
            .position(|b| (b.group, b.binding) == (block.group, block.binding))
        {
            self.blocks[i].size = self.blocks[i].size.max(block.size);
            return i;
        }
        self.blocks.push(block);
        self.blocks.len() - 1
    }

    /// First entry with a name wins.
    fn push(&mut self, entry: UniformEntry) {
        if self.entries.iter().all(|e| e.name != entry.name) {
            self.entries.push(entry);
        }
    }

    /// Folds another stage's table in. Constants both stages declare share
    /// one slot.
    pub fn merge(&mut self, other: &UniformTable) {
        for entry in &other.entries {
            let location = match entry.location {
                UniformLocation::Buffer {
                    block,
                    offset,
                    size,
                } => match other.blocks.get(block) {
                    Some(b) => UniformLocation::Buffer {
                        block: self.add_block(*b),
                        offset,
                        size,
                    },
                    None => continue,
                },
                binding => binding,
            };
            self.push(UniformEntry {
                location,
                ..entry.clone()
            });
        }
    }

    /// Linear, case-sensitive lookup.
    pub fn resolve(&self, name: &str) -> ConstantId {
        self.entries
            .iter()
            .position(|e| e.name == name)
            .and_then(|i| i32::try_from(i).ok())
            .map_or(ConstantId::INVALID, ConstantId)
    }

    pub fn get(&self, id: ConstantId) -> Option<&UniformEntry> {
        self.entries.get(id.index()?)
    }

    pub fn entries(&self) -> &[UniformEntry] {
        &self.entries
    }

    pub fn blocks(&self) -> &[UniformBlock] {
        &self.blocks
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn scalar_kind(module: &Module, ty: Handle<Type>) -> Option<ConstantKind> {
    kind_of(module, &module.types[ty].inner)
}

fn kind_of(module: &Module, inner: &TypeInner) -> Option<ConstantKind> {
    let scalar = match inner {
        TypeInner::Scalar(scalar)
        | TypeInner::Vector { scalar, .. }
        | TypeInner::Matrix { scalar, .. } => *scalar,
        TypeInner::Array { base, .. } => return scalar_kind(module, *base),
        _ => return None,
    };

    match scalar.kind {
        ScalarKind::Float | ScalarKind::AbstractFloat => Some(ConstantKind::Float),
        ScalarKind::Sint | ScalarKind::Bool | ScalarKind::AbstractInt => Some(ConstantKind::Int),
        ScalarKind::Uint => Some(ConstantKind::Uint),
    }
}
