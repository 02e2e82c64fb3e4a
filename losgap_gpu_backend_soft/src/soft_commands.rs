/// Commands executed against resource storage
///
/// Immediate contexts apply a command as soon as it is issued; deferred
/// contexts record it and the immediate context replays the recording when the
/// command list is executed.

use losgap_gpu::losgap::{Error, Result};
use losgap_gpu::losgap::resource::{SubresourceBox, texture_utils};
use crate::soft_mipgen::downsample;
use crate::soft_storage::{ResourceKey, ResourceSlots, SoftResource, SoftResourceKind};

#[derive(Debug, Clone)]
pub(crate) enum SoftCommand {
    /// Overwrite a region with pitched bytes
    UpdateRegion {
        resource: ResourceKey,
        subresource: u32,
        region: SubresourceBox,
        data: Vec<u8>,
        row_pitch: u32,
        depth_pitch: u32,
    },
    CopyResource {
        source: ResourceKey,
        destination: ResourceKey,
    },
    CopySubresourceRegion {
        source: ResourceKey,
        source_subresource: u32,
        region: SubresourceBox,
        destination: ResourceKey,
        destination_subresource: u32,
        destination_offset: [u32; 3],
    },
    /// Rebuild mips `first_mip + 1 .. first_mip + num_mips` of some array slices
    GenerateMips {
        resource: ResourceKey,
        first_mip: u32,
        num_mips: u32,
        first_slice: u32,
        num_slices: u32,
    },
    /// Whole-subresource contents captured from a mapping
    ReplaceSubresource {
        resource: ResourceKey,
        subresource: u32,
        data: Vec<u8>,
    },
}

fn resource(resources: &ResourceSlots, key: ResourceKey) -> Result<&SoftResource> {
    resources
        .get(key)
        .ok_or_else(|| Error::BackendError("Command refers to a released resource.".to_string()))
}

fn resource_mut(resources: &mut ResourceSlots, key: ResourceKey) -> Result<&mut SoftResource> {
    resources
        .get_mut(key)
        .ok_or_else(|| Error::BackendError("Command refers to a released resource.".to_string()))
}

impl SoftCommand {
    pub fn name(&self) -> &'static str {
        match self {
            SoftCommand::UpdateRegion { .. } => "UpdateRegion",
            SoftCommand::CopyResource { .. } => "CopyResource",
            SoftCommand::CopySubresourceRegion { .. } => "CopySubresourceRegion",
            SoftCommand::GenerateMips { .. } => "GenerateMips",
            SoftCommand::ReplaceSubresource { .. } => "ReplaceSubresource",
        }
    }

    /// Run the command against `resources`
    pub fn apply(&self, resources: &mut ResourceSlots) -> Result<()> {
        match self {
            SoftCommand::UpdateRegion { resource, subresource, region, data, row_pitch, depth_pitch } => {
                resource_mut(resources, *resource)?
                    .subresource_mut(*subresource)?
                    .write_region(region, data, *row_pitch, *depth_pitch)
            }
            SoftCommand::CopyResource { source, destination } => {
                let source_resource = resource(resources, *source)?;
                let contents: Vec<Vec<u8>> = source_resource
                    .subresources
                    .iter()
                    .map(|subresource| subresource.data.clone())
                    .collect();
                let destination_resource = resource_mut(resources, *destination)?;
                if contents.len() != destination_resource.subresources.len() {
                    return Err(Error::BackendError("Copied resources have different layouts.".to_string()));
                }
                for (subresource, bytes) in destination_resource.subresources.iter_mut().zip(contents) {
                    if subresource.data.len() != bytes.len() {
                        return Err(Error::BackendError("Copied resources have different layouts.".to_string()));
                    }
                    subresource.data = bytes;
                }
                Ok(())
            }
            SoftCommand::CopySubresourceRegion {
                source,
                source_subresource,
                region,
                destination,
                destination_subresource,
                destination_offset,
            } => {
                let source_resource = resource(resources, *source)?;
                let texel_size = source_resource.texel_size();
                let bytes = source_resource.subresource(*source_subresource)?.read_region(region)?;
                let [u, v, w] = *destination_offset;
                let target = SubresourceBox::new_3d(
                    u,
                    u + region.width(),
                    v,
                    v + region.height(),
                    w,
                    w + region.depth(),
                );
                let row_pitch = region.width() * texel_size;
                resource_mut(resources, *destination)?
                    .subresource_mut(*destination_subresource)?
                    .write_region(&target, &bytes, row_pitch, row_pitch * region.height())
            }
            SoftCommand::GenerateMips { resource, first_mip, num_mips, first_slice, num_slices } => {
                let target = resource_mut(resources, *resource)?;
                let SoftResourceKind::Texture { format, num_mips: total_mips, .. } = target.kind else {
                    return Err(Error::BackendError("Can not generate mips of a buffer.".to_string()));
                };
                for slice in *first_slice..first_slice + num_slices {
                    for mip in first_mip + 1..first_mip + num_mips {
                        let source_index = texture_utils::subresource_index(total_mips, mip - 1, slice) as usize;
                        let destination_index = texture_utils::subresource_index(total_mips, mip, slice) as usize;
                        if destination_index >= target.subresources.len() {
                            return Err(Error::BackendError(format!("Mip {} of slice {} does not exist.", mip, slice)));
                        }
                        let (head, tail) = target.subresources.split_at_mut(destination_index);
                        downsample(format, &head[source_index], &mut tail[0]);
                    }
                }
                Ok(())
            }
            SoftCommand::ReplaceSubresource { resource, subresource, data } => {
                let target = resource_mut(resources, *resource)?.subresource_mut(*subresource)?;
                if target.data.len() != data.len() {
                    return Err(Error::BackendError("Mapped contents changed size.".to_string()));
                }
                target.data.copy_from_slice(data);
                Ok(())
            }
        }
    }
}
