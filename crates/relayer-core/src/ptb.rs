//! Programmable Transaction Block model.
//!
//! A ledger-independent PTB: the ledger client maps [`ProgrammableTransaction`]
//! onto its own transaction type, resolving [`ObjectInput::Bare`] ids to full
//! object references at that point.

use std::collections::HashMap;

use move_core_types::account_address::AccountAddress;
use move_core_types::identifier::Identifier;
use move_core_types::language_storage::TypeTag;

use crate::cache::ObjectCacheEntry;

/// Reference to a value in a PTB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Argument {
    /// The gas coin of the transaction.
    GasCoin,
    /// Reference to a transaction input (by index)
    Input(u16),
    /// Reference to the result of a previous command (by command index)
    Result(u16),
    /// (command_index, value_index) of a multi-return command.
    NestedResult(u16, u16),
}

/// How an object input is referenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectInput {
    /// Only the id is known; the ledger client looks up version and ownership.
    Bare { id: AccountAddress, mutable: bool },
    /// Reference taken from the object cache.
    Known {
        entry: ObjectCacheEntry,
        mutable: bool,
    },
}

impl ObjectInput {
    pub fn id(&self) -> AccountAddress {
        match self {
            ObjectInput::Bare { id, .. } => *id,
            ObjectInput::Known { entry, .. } => entry.object_id,
        }
    }

    pub fn is_mutable(&self) -> bool {
        match self {
            ObjectInput::Bare { mutable, .. } | ObjectInput::Known { mutable, .. } => *mutable,
        }
    }

    fn set_mutable(&mut self) {
        match self {
            ObjectInput::Bare { mutable, .. } | ObjectInput::Known { mutable, .. } => {
                *mutable = true
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArg {
    /// A pure BCS-serialized value
    Pure(Vec<u8>),
    Object(ObjectInput),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveCall {
    pub package: AccountAddress,
    pub module: Identifier,
    pub function: Identifier,
    pub type_arguments: Vec<TypeTag>,
    pub arguments: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    MoveCall(Box<MoveCall>),
    /// Build a vector from elements; the tag is required when elements are
    /// objects of a generic type.
    MakeMoveVec(Option<TypeTag>, Vec<Argument>),
}

/// A finished transaction, ready for simulation or submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgrammableTransaction {
    pub inputs: Vec<CallArg>,
    pub commands: Vec<Command>,
}

impl ProgrammableTransaction {
    pub fn move_calls(&self) -> impl Iterator<Item = (usize, &MoveCall)> {
        self.commands
            .iter()
            .enumerate()
            .filter_map(|(idx, cmd)| match cmd {
                Command::MoveCall(call) => Some((idx, call.as_ref())),
                Command::MakeMoveVec(..) => None,
            })
    }
}

/// Incremental PTB builder. Object inputs are de-duplicated by id.
#[derive(Debug, Default)]
pub struct PTBBuilder {
    inputs: Vec<CallArg>,
    commands: Vec<Command>,
    objects: HashMap<AccountAddress, u16>,
}

impl PTBBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add raw bytes as a pure input.
    pub fn pure_bytes(&mut self, bytes: Vec<u8>) -> Argument {
        let idx = self.inputs.len() as u16;
        self.inputs.push(CallArg::Pure(bytes));
        Argument::Input(idx)
    }

    /// Add an object input, reusing an existing input for the same id.
    /// A repeated mutable request upgrades the existing input.
    pub fn object(&mut self, input: ObjectInput) -> Argument {
        let id = input.id();
        if let Some(&idx) = self.objects.get(&id) {
            if input.is_mutable() {
                if let Some(CallArg::Object(existing)) = self.inputs.get_mut(idx as usize) {
                    existing.set_mutable();
                }
            }
            return Argument::Input(idx);
        }
        let idx = self.inputs.len() as u16;
        self.inputs.push(CallArg::Object(input));
        self.objects.insert(id, idx);
        Argument::Input(idx)
    }

    /// Append a MoveCall and return its result argument.
    pub fn move_call(&mut self, call: MoveCall) -> Argument {
        self.command(Command::MoveCall(Box::new(call)))
    }

    pub fn make_move_vec(&mut self, type_tag: Option<TypeTag>, elements: Vec<Argument>) -> Argument {
        self.command(Command::MakeMoveVec(type_tag, elements))
    }

    fn command(&mut self, command: Command) -> Argument {
        let idx = self.commands.len() as u16;
        self.commands.push(command);
        Argument::Result(idx)
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    pub fn finish(self) -> ProgrammableTransaction {
        ProgrammableTransaction {
            inputs: self.inputs,
            commands: self.commands,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use move_core_types::ident_str;

    fn call(arguments: Vec<Argument>) -> MoveCall {
        MoveCall {
            package: AccountAddress::TWO,
            module: ident_str!("m").to_owned(),
            function: ident_str!("f").to_owned(),
            type_arguments: vec![],
            arguments,
        }
    }

    #[test]
    fn test_object_inputs_deduplicated_and_upgraded() {
        let mut ptb = PTBBuilder::new();
        let id = AccountAddress::new([1; 32]);
        let first = ptb.object(ObjectInput::Bare { id, mutable: false });
        let pure = ptb.pure_bytes(42u64.to_le_bytes().to_vec());
        let second = ptb.object(ObjectInput::Bare { id, mutable: true });
        assert_eq!(first, second);
        assert_eq!(pure, Argument::Input(1));

        let tx = ptb.finish();
        assert_eq!(tx.inputs.len(), 2);
        assert_eq!(
            tx.inputs[0],
            CallArg::Object(ObjectInput::Bare { id, mutable: true })
        );
    }

    #[test]
    fn test_immutable_repeat_does_not_downgrade() {
        let mut ptb = PTBBuilder::new();
        let id = AccountAddress::new([1; 32]);
        ptb.object(ObjectInput::Bare { id, mutable: true });
        ptb.object(ObjectInput::Bare { id, mutable: false });
        let tx = ptb.finish();
        assert!(matches!(&tx.inputs[0], CallArg::Object(o) if o.is_mutable()));
    }

    #[test]
    fn test_command_results_are_indexed() {
        let mut ptb = PTBBuilder::new();
        let a = ptb.pure_bytes(vec![1]);
        let r0 = ptb.move_call(call(vec![a]));
        let r1 = ptb.make_move_vec(None, vec![r0]);
        assert_eq!(r0, Argument::Result(0));
        assert_eq!(r1, Argument::Result(1));
        let tx = ptb.finish();
        assert_eq!(tx.move_calls().count(), 1);
    }
}
