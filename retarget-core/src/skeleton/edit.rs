use glam::Vec3;
use log::debug;

use super::bone::{Bone, PoseBone};
use super::Skeleton;
use crate::error::{Result, RigError};

/// Mutable bone-geometry view, obtained from [`Skeleton::edit_bones`].
///
/// Every setter keeps the connection invariant: a connected bone's head equals its parent's
/// tail. Moving one end of a connected joint moves the other end with it.
pub struct EditBones<'a> {
    skeleton: &'a mut Skeleton,
}

impl<'a> EditBones<'a> {
    pub(super) fn new(skeleton: &'a mut Skeleton) -> Self { Self { skeleton } }

    pub fn skeleton_name(&self) -> &str { &self.skeleton.name }
    pub fn bones(&self) -> &[Bone] { &self.skeleton.bones }
    pub fn contains(&self, name: &str) -> bool { self.skeleton.contains(name) }
    pub fn get(&self, name: &str) -> Result<&Bone> { self.skeleton.bone(name) }

    pub fn set_head(&mut self, name: &str, head: Vec3) -> Result<()> {
        let idx = self.index(name)?;
        self.skeleton.bones[idx].head = head;
        if self.skeleton.bones[idx].use_connect {
            if let Some(parent) = self.parent_index(idx) {
                self.move_tail(parent, head);
            }
        }
        Ok(())
    }

    pub fn set_tail(&mut self, name: &str, tail: Vec3) -> Result<()> {
        let idx = self.index(name)?;
        self.move_tail(idx, tail);
        Ok(())
    }

    pub fn set_roll(&mut self, name: &str, roll: f32) -> Result<()> {
        let idx = self.index(name)?;
        self.skeleton.bones[idx].roll = roll;
        Ok(())
    }

    /// Connecting snaps the head onto the parent's tail. Root bones cannot be connected.
    pub fn set_use_connect(&mut self, name: &str, connect: bool) -> Result<()> {
        let idx = self.index(name)?;
        match (connect, self.parent_index(idx)) {
            (true, Some(parent)) => {
                let tail = self.skeleton.bones[parent].tail;
                let bone = &mut self.skeleton.bones[idx];
                bone.head = tail;
                bone.use_connect = true;
            }
            (true, None) => debug!("'{}' has no parent to connect to", name),
            (false, _) => self.skeleton.bones[idx].use_connect = false,
        }
        Ok(())
    }

    /// Re-parent a bone. The joint is left disconnected.
    pub fn set_parent(&mut self, name: &str, parent: Option<&str>) -> Result<()> {
        let idx = self.index(name)?;
        if let Some(parent) = parent {
            let mut cursor = Some(self.index(parent)?);
            while let Some(i) = cursor {
                if i == idx {
                    return Err(RigError::ParentCycle { skeleton: self.skeleton.name.clone(), bone: name.to_string() });
                }
                cursor = self.parent_index(i);
            }
        }
        let bone = &mut self.skeleton.bones[idx];
        bone.parent = parent.map(str::to_string);
        bone.use_connect = false;
        Ok(())
    }

    /// Add a bone; a taken name is made unique. Returns the name actually used.
    pub fn add(&mut self, mut bone: Bone) -> Result<String> {
        if let Some(parent) = bone.parent.as_deref() {
            match self.skeleton.get(parent) {
                Some(p) if bone.use_connect => bone.head = p.tail,
                Some(_) => {}
                None => {
                    return Err(RigError::DanglingParent {
                        skeleton: self.skeleton.name.clone(),
                        bone: bone.name.clone(),
                        parent: parent.to_string(),
                    })
                }
            }
        } else {
            bone.use_connect = false;
        }
        bone.name = self.skeleton.unique_name(&bone.name);
        let name = bone.name.clone();
        self.skeleton.bones.push(bone);
        Ok(name)
    }

    /// Remove a bone; its children are re-parented to its parent and disconnected.
    pub fn remove(&mut self, name: &str) -> Result<Bone> {
        let idx = self.index(name)?;
        let removed = self.skeleton.bones.remove(idx);
        for bone in &mut self.skeleton.bones {
            if bone.parent.as_deref() == Some(name) {
                bone.parent = removed.parent.clone();
                bone.use_connect = false;
            }
        }
        Ok(removed)
    }

    fn index(&self, name: &str) -> Result<usize> {
        self.skeleton.index_of(name).ok_or_else(|| RigError::missing_bone(&self.skeleton.name, name))
    }

    fn parent_index(&self, idx: usize) -> Option<usize> {
        self.skeleton.bones[idx].parent.as_deref().and_then(|p| self.skeleton.index_of(p))
    }

    fn move_tail(&mut self, idx: usize, tail: Vec3) {
        self.skeleton.bones[idx].tail = tail;
        let parent = self.skeleton.bones[idx].name.clone();
        for child in &mut self.skeleton.bones {
            if child.use_connect && child.parent.as_deref() == Some(parent.as_str()) {
                child.head = tail;
            }
        }
    }
}

/// Mutable pose-data view, obtained from [`Skeleton::pose_bones`].
pub struct PoseBones<'a> {
    skeleton: &'a mut Skeleton,
}

impl<'a> PoseBones<'a> {
    pub(super) fn new(skeleton: &'a mut Skeleton) -> Self { Self { skeleton } }

    pub fn get(&self, name: &str) -> Result<&PoseBone> { self.skeleton.bone(name).map(|b| &b.pose) }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut PoseBone> {
        let skeleton = self.skeleton.name.clone();
        self.skeleton
            .bones
            .iter_mut()
            .find(|b| b.name == name)
            .map(|b| &mut b.pose)
            .ok_or_else(|| RigError::missing_bone(&skeleton, name))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut PoseBone)> {
        self.skeleton.bones.iter_mut().map(|b| (b.name.as_str(), &mut b.pose))
    }
}
