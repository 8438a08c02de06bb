use super::module::*;
use super::register::*;
use super::signal::*;
use super::wire::*;

use crate::error::ConditionalError;

use log::{debug, trace};

use std::collections::HashSet;
use std::fmt;
use std::ptr;

/// A register or wire that can receive conditional assignments in a [`ConditionalBlock`].
///
/// Registers hold their current value on every path that doesn't assign them; wires are zero on those paths.
///
/// `Target` implements `From` for both `&Register` and `&Wire`, so it's rarely named explicitly.
///
/// [`ConditionalBlock`]: ./struct.ConditionalBlock.html
#[derive(Clone, Copy)]
pub enum Target<'a> {
    Register(&'a Register<'a>),
    Wire(&'a Wire<'a>),
}

impl<'a> Target<'a> {
    /// Returns the name of the underlying register or wire.
    pub fn name(&self) -> &'a str {
        match *self {
            Target::Register(register) => &register.data.name,
            Target::Wire(wire) => &wire.data.name,
        }
    }

    /// Returns the bit width of the underlying register or wire.
    pub fn bit_width(&self) -> u32 {
        match *self {
            Target::Register(register) => register.data.bit_width,
            Target::Wire(wire) => wire.data.bit_width,
        }
    }

    /// Returns `true` if this target is a register, and thus holds its value when unassigned.
    pub fn is_register(&self) -> bool {
        matches!(self, Target::Register(_))
    }

    /// Returns the signal representing the current value of the underlying register or wire.
    pub fn value(&self) -> &'a Signal<'a> {
        match *self {
            Target::Register(register) => register.value,
            Target::Wire(wire) => wire.value,
        }
    }

    fn module(&self) -> &'a Module<'a> {
        self.value().module
    }

    fn key(&self) -> *const () {
        match *self {
            Target::Register(register) => register.data as *const RegisterData as *const (),
            Target::Wire(wire) => wire.data as *const WireData as *const (),
        }
    }

    fn fallback(&self) -> &'a Signal<'a> {
        match *self {
            Target::Register(register) => register.value,
            Target::Wire(wire) => wire.value.module.lit(0u32, wire.data.bit_width),
        }
    }

    fn is_driven(&self) -> bool {
        match *self {
            Target::Register(register) => register.is_driven(),
            Target::Wire(wire) => wire.is_driven(),
        }
    }

    fn drive(&self, value: &'a Signal<'a>) {
        match *self {
            Target::Register(register) => register.drive_next(value),
            Target::Wire(wire) => wire.drive(value),
        }
    }
}

impl<'a> From<&'a Register<'a>> for Target<'a> {
    fn from(register: &'a Register<'a>) -> Self {
        Target::Register(register)
    }
}

impl<'a> From<&'a Wire<'a>> for Target<'a> {
    fn from(wire: &'a Wire<'a>) -> Self {
        Target::Wire(wire)
    }
}

impl<'a> PartialEq for Target<'a> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.key(), other.key())
    }
}

impl<'a> Eq for Target<'a> {}

impl<'a> fmt::Debug for Target<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Register(_) => f.debug_tuple("Register").field(&self.name()).finish(),
            Target::Wire(_) => f.debug_tuple("Wire").field(&self.name()).finish(),
        }
    }
}

/// Identifies a branch of a [`ConditionalBlock`].
///
/// A `BranchId` is only meaningful for the block that created it; passing it to another block is an error.
///
/// [`ConditionalBlock`]: ./struct.ConditionalBlock.html
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct BranchId {
    block: u32,
    index: usize,
}

struct Branch<'a> {
    // None for the root and for `otherwise` branches
    predicate: Option<&'a Signal<'a>>,
    // (parent branch, scope) for every branch but the root
    parent: Option<(usize, usize)>,
    scopes: Vec<usize>,
    assignments: Vec<usize>,
}

struct Scope {
    branches: Vec<usize>,
    closed: bool,
}

struct Assignment<'a> {
    target: Target<'a>,
    value: &'a Signal<'a>,
}

/// Describes prioritized, nested conditional assignments to registers and wires of a [`Module`], created by the [`Module`]::[`conditional`] method.
///
/// A block is a tree of branches. Every branch but the root belongs to a *scope*: an ordered list of sibling branches opened by [`when`], extended by [`else_when`] and optionally closed by [`otherwise`]. Within a scope, the first branch whose condition is true wins. A branch's scopes are nested inside it, so their branches are only enabled when every enclosing branch is.
///
/// Assignments are recorded with [`assign_under`]. When the block is [resolved], every assigned target becomes a single multiplexer chain implementing "the most specific enabled assignment wins, else fall back", where the fallback is the current value for registers and zero for wires.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), joken::ConditionalError> {
/// use joken::*;
///
/// let c = Context::new();
///
/// let m = c.module("MyModule");
/// let load = m.input("load", 1);
/// let clear = m.input("clear", 1);
/// let data = m.input("data", 8);
/// let r = m.reg("r", 8);
///
/// let mut block = m.conditional();
/// let root = block.root();
/// // if clear { r = 0 } else if load { r = data } (else r holds)
/// let clearing = block.when(root, clear)?;
/// block.assign_under(clearing, r, m.lit(0u32, 8))?;
/// let loading = block.else_when(clearing, load)?;
/// block.assign_under(loading, r, data)?;
/// block.finish()?;
///
/// m.output("r", r.value);
/// # Ok(())
/// # }
/// ```
///
/// [`assign_under`]: #method.assign_under
/// [`conditional`]: ./struct.Module.html#method.conditional
/// [`else_when`]: #method.else_when
/// [`Module`]: ./struct.Module.html
/// [`otherwise`]: #method.otherwise
/// [resolved]: #method.resolve
/// [`when`]: #method.when
#[must_use]
pub struct ConditionalBlock<'a> {
    module: &'a Module<'a>,
    id: u32,

    branches: Vec<Branch<'a>>,
    scopes: Vec<Scope>,
    assignments: Vec<Assignment<'a>>,
}

impl<'a> ConditionalBlock<'a> {
    pub(super) fn new(module: &'a Module<'a>, id: u32) -> ConditionalBlock<'a> {
        ConditionalBlock {
            module,
            id,

            branches: vec![Branch {
                predicate: None,
                parent: None,
                scopes: Vec::new(),
                assignments: Vec::new(),
            }],
            scopes: Vec::new(),
            assignments: Vec::new(),
        }
    }

    /// Returns the root branch of this block, which is always enabled.
    ///
    /// Assignments under the root are unconditional, but can still be overridden by nested scopes.
    pub fn root(&self) -> BranchId {
        BranchId {
            block: self.id,
            index: 0,
        }
    }

    /// Opens a new scope inside `parent`, and returns its first branch, which is enabled when `predicate` is high.
    ///
    /// Scopes opened earlier inside the same parent take priority over scopes opened later.
    pub fn when(
        &mut self,
        parent: BranchId,
        predicate: &'a Signal<'a>,
    ) -> Result<BranchId, ConditionalError> {
        let parent = self.branch_index(parent)?;
        self.check_predicate(predicate)?;
        let scope = self.scopes.len();
        self.scopes.push(Scope {
            branches: Vec::new(),
            closed: false,
        });
        self.branches[parent].scopes.push(scope);
        Ok(self.push_branch(parent, scope, Some(predicate)))
    }

    /// Appends a branch enabled by `predicate` to the scope containing `sibling`.
    ///
    /// The new branch is only enabled when no earlier branch of the scope is.
    pub fn else_when(
        &mut self,
        sibling: BranchId,
        predicate: &'a Signal<'a>,
    ) -> Result<BranchId, ConditionalError> {
        let (parent, scope) = self.open_scope_of(sibling)?;
        self.check_predicate(predicate)?;
        Ok(self.push_branch(parent, scope, Some(predicate)))
    }

    /// Appends the trailing branch to the scope containing `sibling`, which is enabled exactly when none of the scope's other branches are, and closes the scope.
    pub fn otherwise(&mut self, sibling: BranchId) -> Result<BranchId, ConditionalError> {
        let (parent, scope) = self.open_scope_of(sibling)?;
        let branch = self.push_branch(parent, scope, None);
        self.scopes[scope].closed = true;
        Ok(branch)
    }

    /// Records that `target` takes `value` when `branch` is the most specific enabled branch assigning it.
    ///
    /// # Errors
    ///
    /// Fails if `branch` doesn't belong to this block, if `target` or `value` belong to another module, if the bit widths of `target` and `value` differ, or if `target` is already assigned under `branch`.
    pub fn assign_under<T: Into<Target<'a>>>(
        &mut self,
        branch: BranchId,
        target: T,
        value: &'a Signal<'a>,
    ) -> Result<(), ConditionalError> {
        let branch = self.branch_index(branch)?;
        let target = target.into();
        if !ptr::eq(target.module(), self.module) || !ptr::eq(value.module, self.module) {
            return Err(ConditionalError::ForeignSignal {
                module: self.module.name.clone(),
            });
        }
        if value.bit_width() != target.bit_width() {
            return Err(ConditionalError::WidthMismatch {
                module: self.module.name.clone(),
                target: target.name().to_owned(),
                target_bit_width: target.bit_width(),
                value_bit_width: value.bit_width(),
            });
        }
        if self.branches[branch]
            .assignments
            .iter()
            .any(|&assignment| self.assignments[assignment].target == target)
        {
            return Err(ConditionalError::AmbiguousAssignment {
                module: self.module.name.clone(),
                target: target.name().to_owned(),
            });
        }

        let assignment = self.assignments.len();
        self.assignments.push(Assignment { target, value });
        self.branches[branch].assignments.push(assignment);
        Ok(())
    }

    /// Returns a 1-bit signal that is high exactly when `branch` is enabled: its own condition holds, no earlier sibling's does, and the same is true for every enclosing branch.
    pub fn effective_condition(
        &self,
        branch: BranchId,
    ) -> Result<&'a Signal<'a>, ConditionalError> {
        let branch = self.branch_index(branch)?;
        Ok(self.enable(branch))
    }

    /// Lowers every assignment of this block into one multiplexer chain per target.
    ///
    /// Targets that are never assigned are not part of the returned [`Resolution`]. Resolving doesn't drive any target; see [`Resolution::drive`] or [`finish`].
    ///
    /// # Errors
    ///
    /// Fails if any assigned target is already driven.
    ///
    /// [`finish`]: #method.finish
    /// [`Resolution`]: ./struct.Resolution.html
    /// [`Resolution::drive`]: ./struct.Resolution.html#method.drive
    #[must_use]
    pub fn resolve(self) -> Result<Resolution<'a>, ConditionalError> {
        let mut targets = Vec::new();
        let mut seen = HashSet::new();
        for assignment in self.assignments.iter() {
            if seen.insert(assignment.target.key()) {
                targets.push(assignment.target);
            }
        }

        debug!(
            "Resolving conditional block {} of module \"{}\": {} branch(es), {} assignment(s), {} target(s)",
            self.id,
            self.module.name,
            self.branches.len(),
            self.assignments.len(),
            targets.len()
        );

        let mut entries = Vec::with_capacity(targets.len());
        for target in targets {
            if target.is_driven() {
                return Err(self.already_driven(&target));
            }
            let mentions = self.mentions(&target);
            let value = self.branch_value(0, &target, &mentions, target.fallback());
            trace!(
                "Resolved target \"{}\" ({} of {} branch(es) involved)",
                target.name(),
                mentions.len(),
                self.branches.len()
            );
            entries.push((target, value));
        }

        Ok(Resolution {
            module: self.module,
            entries,
        })
    }

    /// Resolves this block and drives every assigned target with its resolved value.
    pub fn finish(self) -> Result<Resolution<'a>, ConditionalError> {
        let resolution = self.resolve()?;
        resolution.drive()?;
        Ok(resolution)
    }

    fn branch_index(&self, branch: BranchId) -> Result<usize, ConditionalError> {
        if branch.block != self.id || branch.index >= self.branches.len() {
            return Err(ConditionalError::UnknownBranch {
                module: self.module.name.clone(),
            });
        }
        Ok(branch.index)
    }

    fn open_scope_of(&self, sibling: BranchId) -> Result<(usize, usize), ConditionalError> {
        let sibling = self.branch_index(sibling)?;
        match self.branches[sibling].parent {
            Some((parent, scope)) if !self.scopes[scope].closed => Ok((parent, scope)),
            _ => Err(ConditionalError::ClosedScope {
                module: self.module.name.clone(),
            }),
        }
    }

    fn check_predicate(&self, predicate: &'a Signal<'a>) -> Result<(), ConditionalError> {
        if !ptr::eq(predicate.module, self.module) {
            return Err(ConditionalError::ForeignSignal {
                module: self.module.name.clone(),
            });
        }
        if predicate.bit_width() != 1 {
            return Err(ConditionalError::PredicateWidth {
                module: self.module.name.clone(),
                bit_width: predicate.bit_width(),
            });
        }
        Ok(())
    }

    fn push_branch(
        &mut self,
        parent: usize,
        scope: usize,
        predicate: Option<&'a Signal<'a>>,
    ) -> BranchId {
        let index = self.branches.len();
        self.branches.push(Branch {
            predicate,
            parent: Some((parent, scope)),
            scopes: Vec::new(),
            assignments: Vec::new(),
        });
        self.scopes[scope].branches.push(index);
        BranchId {
            block: self.id,
            index,
        }
    }

    fn already_driven(&self, target: &Target<'a>) -> ConditionalError {
        ConditionalError::TargetAlreadyDriven {
            module: self.module.name.clone(),
            target: target.name().to_owned(),
        }
    }

    fn enable(&self, index: usize) -> &'a Signal<'a> {
        let branch = &self.branches[index];
        let (parent, scope) = match branch.parent {
            Some(parent_and_scope) => parent_and_scope,
            None => return self.module.high(),
        };

        let mut cond = branch.predicate;
        for &sibling in self.scopes[scope]
            .branches
            .iter()
            .take_while(|&&sibling| sibling != index)
        {
            if let Some(predicate) = self.branches[sibling].predicate {
                let not_taken = !predicate;
                cond = Some(match cond {
                    Some(cond) => cond & not_taken,
                    None => not_taken,
                });
            }
        }
        let cond = cond.unwrap_or_else(|| self.module.high());

        if self.branches[parent].parent.is_none() {
            cond
        } else {
            self.enable(parent) & cond
        }
    }

    // Every branch that assigns `target` directly, plus all of their ancestors
    fn mentions(&self, target: &Target<'a>) -> HashSet<usize> {
        let mut mentions = HashSet::new();
        for (index, branch) in self.branches.iter().enumerate() {
            if !branch
                .assignments
                .iter()
                .any(|&assignment| self.assignments[assignment].target == *target)
            {
                continue;
            }
            let mut current = Some(index);
            while let Some(branch) = current {
                if !mentions.insert(branch) {
                    break;
                }
                current = self.branches[branch].parent.map(|(parent, _)| parent);
            }
        }
        mentions
    }

    fn branch_value(
        &self,
        index: usize,
        target: &Target<'a>,
        mentions: &HashSet<usize>,
        fallback: &'a Signal<'a>,
    ) -> &'a Signal<'a> {
        let branch = &self.branches[index];
        let base = branch
            .assignments
            .iter()
            .map(|&assignment| &self.assignments[assignment])
            .find(|assignment| assignment.target == *target)
            .map_or(fallback, |assignment| assignment.value);

        // Earlier scopes wrap later ones, so they take priority
        branch.scopes.iter().rev().fold(base, |value, &scope| {
            self.scope_value(scope, target, mentions, value)
        })
    }

    fn scope_value(
        &self,
        scope: usize,
        target: &Target<'a>,
        mentions: &HashSet<usize>,
        fallback: &'a Signal<'a>,
    ) -> &'a Signal<'a> {
        let branches = &self.scopes[scope].branches;
        if !branches.iter().any(|branch| mentions.contains(branch)) {
            return fallback;
        }

        branches.iter().rev().fold(fallback, |value, &index| {
            let branch_value = if mentions.contains(&index) {
                self.branch_value(index, target, mentions, fallback)
            } else {
                fallback
            };
            match self.branches[index].predicate {
                Some(predicate) => predicate.mux(branch_value, value),
                None => branch_value,
            }
        })
    }
}

/// The result of resolving a [`ConditionalBlock`]: one resolved signal per assigned target, in order of each target's first assignment.
///
/// [`ConditionalBlock`]: ./struct.ConditionalBlock.html
pub struct Resolution<'a> {
    module: &'a Module<'a>,
    entries: Vec<(Target<'a>, &'a Signal<'a>)>,
}

impl<'a> Resolution<'a> {
    /// Returns the resolved signal for `target`, or `None` if the block never assigned it.
    pub fn get<T: Into<Target<'a>>>(&self, target: T) -> Option<&'a Signal<'a>> {
        let target = target.into();
        self.entries
            .iter()
            .find(|(entry, _)| *entry == target)
            .map(|&(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Target<'a>, &'a Signal<'a>)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drives every target with its resolved signal: registers via [`Register::drive_next`], wires via [`Wire::drive`].
    ///
    /// Nothing is driven if any target is already driven.
    ///
    /// [`Register::drive_next`]: ./struct.Register.html#method.drive_next
    /// [`Wire::drive`]: ./struct.Wire.html#method.drive
    pub fn drive(&self) -> Result<(), ConditionalError> {
        if let Some((target, _)) = self.entries.iter().find(|(target, _)| target.is_driven()) {
            return Err(ConditionalError::TargetAlreadyDriven {
                module: self.module.name.clone(),
                target: target.name().to_owned(),
            });
        }
        for &(target, value) in self.entries.iter() {
            target.drive(value);
        }
        Ok(())
    }
}
