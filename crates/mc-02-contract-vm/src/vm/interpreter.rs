//! # Interpreter
//!
//! The fetch loop and every opcode.
//!
//! ## Entry Frame
//!
//! Before the first instruction the stack holds, bottom to top:
//!
//! ```text
//! Hash(callee address)
//! [Hash(in_address) …]
//! amount_spent
//! params…
//! -1            <- fp   (saved frame pointer of the outermost frame)
//! -1                    (return pc: -1 halts on OP_RET)
//! ```
//!
//! so params sit at negative frame offsets: the last param is `-1 OP_PUSHR`.
//!
//! ## Calls
//!
//! `OP_CALL` pushes the caller's fp, points fp at it, pushes the return pc
//! and jumps. `OP_RET` pops the return value, truncates the stack to fp,
//! restores fp and pc, and pushes the return value back. Arguments pushed
//! before the call stay on the caller's stack.

use super::{parse_program, parse_values, Item, Opcode, Stack, Value};
use crate::config::VmConfig;
use crate::errors::VmError;
use mc_01_state_trie::WorldState;
use shared_crypto::{address, derive_pubkey, keypair_from_seed, sha256, verify, Hash};
use shared_types::{Account, StorageItem};
use tracing::{debug, trace};

/// Values placed on the stack ahead of the callee's code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Params {
    /// Already-parsed values (nested calls from `OP_TRANSFER`).
    Values(Vec<Value>),
    /// Literal-only program text (transaction output params).
    Script(String),
}

impl Params {
    pub fn none() -> Self {
        Params::Values(Vec::new())
    }

    fn into_values(self) -> Result<Vec<Value>, VmError> {
        match self {
            Params::Values(values) => Ok(values),
            Params::Script(text) => parse_values(&text),
        }
    }
}

/// Result of a script that reached its final `OP_RET`.
#[derive(Clone, Debug)]
pub struct ExecutionResult {
    /// Value on top of the stack at the final `OP_RET`.
    pub retval: Value,
    /// State after every write the script made.
    pub state: WorldState,
    /// Instructions executed, including those of nested contract calls.
    pub steps: u64,
}

/// One script execution.
pub struct Vm {
    program: Vec<Item>,
    stack: Stack,
    pc: i64,
    fp: i64,
    state: WorldState,
    acc: Account,
    config: VmConfig,
    depth: usize,
    steps: u64,
    /// Steps left for this VM and every call it makes.
    budget: u64,
}

impl Vm {
    /// Prepare `callee`'s code to run on top of `state`.
    ///
    /// Fails if the code or the params do not parse.
    pub fn new(
        state: WorldState,
        params: Params,
        callee: Account,
        in_addresses: &[Hash],
        amount_spent: i64,
        config: VmConfig,
    ) -> Result<Self, VmError> {
        let budget = config.max_steps;
        Self::with_depth(state, params, callee, in_addresses, amount_spent, config, 0, budget)
    }

    #[allow(clippy::too_many_arguments)]
    fn with_depth(
        state: WorldState,
        params: Params,
        callee: Account,
        in_addresses: &[Hash],
        amount_spent: i64,
        config: VmConfig,
        depth: usize,
        budget: u64,
    ) -> Result<Self, VmError> {
        if depth > config.max_call_depth {
            return Err(VmError::CallDepthExceeded {
                depth,
                max: config.max_call_depth,
            });
        }

        let program = parse_program(callee.code())?;
        let params = params.into_values()?;

        let mut stack = Stack::new(config.max_stack_size, config.max_value_size);
        stack.push(Value::Hash(callee.address()))?;
        stack.push(Value::List(
            in_addresses.iter().copied().map(Value::Hash).collect(),
        ))?;
        stack.push(Value::Int(amount_spent))?;
        for value in params {
            stack.push(value)?;
        }
        stack.push(Value::Int(-1))?;
        let fp = stack_top(&stack);
        stack.push(Value::Int(-1))?;

        Ok(Self {
            program,
            stack,
            pc: 1,
            fp,
            state,
            acc: callee,
            config,
            depth,
            steps: 0,
            budget,
        })
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn pc(&self) -> i64 {
        self.pc
    }

    pub fn fp(&self) -> i64 {
        self.fp
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    /// The executing account as last written to the state.
    pub fn account(&self) -> &Account {
        &self.acc
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Run until the outermost `OP_RET`.
    pub fn run(mut self) -> Result<ExecutionResult, VmError> {
        debug!(
            account = %self.acc.address(),
            depth = self.depth,
            items = self.program.len(),
            "vm start"
        );
        let retval = self.drive()?;
        Ok(ExecutionResult {
            retval,
            state: self.state,
            steps: self.steps,
        })
    }

    fn drive(&mut self) -> Result<Value, VmError> {
        loop {
            match self.step() {
                Ok(Some(retval)) => {
                    debug!(steps = self.steps, retval = %retval, "vm halted");
                    return Ok(retval);
                }
                Ok(None) => {}
                Err(err) => {
                    debug!(pc = self.pc, steps = self.steps, error = %err, "vm failed");
                    return Err(err);
                }
            }
        }
    }

    /// Execute one item. Returns the final value once the VM halts.
    ///
    /// Steps taken by nested calls count against the same limit.
    pub fn step(&mut self) -> Result<Option<Value>, VmError> {
        if self.steps >= self.budget {
            return Err(VmError::StepLimitExceeded {
                max: self.config.max_steps,
            });
        }
        self.steps += 1;

        let item = usize::try_from(self.pc - 1)
            .ok()
            .and_then(|i| self.program.get(i))
            .cloned()
            .ok_or(VmError::PcOutOfRange {
                pc: self.pc,
                len: self.program.len(),
            })?;

        match item {
            Item::Push(value) => {
                self.stack.push(value)?;
                self.pc += 1;
                Ok(None)
            }
            Item::Op(opcode) => {
                if opcode.touches_state() {
                    trace!(pc = self.pc, %opcode, "state access");
                } else {
                    trace!(pc = self.pc, %opcode, stack = self.stack.len());
                }
                self.execute(opcode)
            }
        }
    }

    fn execute(&mut self, opcode: Opcode) -> Result<Option<Value>, VmError> {
        let op = opcode.name();
        let mut next = self.pc + 1;

        match opcode {
            // =================================================================
            // CRYPTO
            // =================================================================
            Opcode::Sha256 => {
                let text = self.stack.pop_str(op)?;
                self.stack.push(Value::Hash(sha256(text.as_bytes())))?;
            }

            Opcode::Hash => {
                let value = self.stack.pop()?;
                self.stack.push(Value::Hash(sha256(&value.hash_preimage()?)))?;
            }

            Opcode::PubkeyFromKeypair => {
                let keypair = self.stack.pop_keypair(op)?;
                self.stack.push(Value::Pubkey(derive_pubkey(&keypair)))?;
            }

            Opcode::VerifySign => {
                let signature = self.stack.pop_signature(op)?;
                let hash = self.stack.pop_hash(op)?;
                let pubkey = self.stack.pop_pubkey(op)?;
                self.stack.push(verify(&pubkey, &hash, &signature).into())?;
            }

            Opcode::GenPubkey => {
                // Negative seeds are taken as their two's-complement bits.
                let seed = self.stack.pop_int(op)? as u64;
                let keypair = keypair_from_seed(seed);
                self.stack.push(Value::Pubkey(derive_pubkey(&keypair)))?;
            }

            // =================================================================
            // STACK
            // =================================================================
            Opcode::Dup => {
                let top = self.stack.peek()?.clone();
                self.stack.push(top)?;
            }

            Opcode::Swap => self.stack.swap_down(1)?,

            Opcode::SwapAny => {
                let depth = self.stack.pop_index(op)?;
                self.stack.swap_down(depth)?;
            }

            Opcode::PushAbs => {
                let index = self.stack.pop_int(op)?;
                let value = self.stack.get(index)?.clone();
                self.stack.push(value)?;
            }

            Opcode::PopAbs => {
                let index = self.stack.pop_int(op)?;
                let value = self.stack.pop()?;
                self.stack.set(index, value)?;
            }

            Opcode::PushFp => self.stack.push(Value::Int(self.fp))?,

            Opcode::PopFp => self.fp = self.stack.pop_int(op)?,

            Opcode::PushSp => {
                let len = stack_len(&self.stack);
                self.stack.push(Value::Int(len))?;
            }

            Opcode::PopSp => {
                let len = self.stack.pop_index(op)?;
                self.stack.truncate(len)?;
            }

            Opcode::PopVoid => {
                self.stack.pop()?;
            }

            Opcode::PushPc => self.stack.push(Value::Int(self.pc))?,

            // =================================================================
            // FRAME-RELATIVE
            // =================================================================
            Opcode::PushR => {
                let offset = self.stack.pop_int(op)?;
                let value = self.stack.get(self.frame_slot(offset, op)?)?.clone();
                self.stack.push(value)?;
            }

            Opcode::PopR => {
                let offset = self.stack.pop_int(op)?;
                let value = self.stack.pop()?;
                self.stack.set(self.frame_slot(offset, op)?, value)?;
            }

            Opcode::IncFp => {
                let offset = self.stack.pop_int(op)?;
                self.fp = self.frame_slot(offset, op)?;
            }

            // =================================================================
            // CONTROL FLOW
            // =================================================================
            Opcode::Jump => next = self.stack.pop_int(op)?,

            Opcode::JumpR => {
                let offset = self.stack.pop_int(op)?;
                next = self.relative(offset, op)?;
            }

            Opcode::JumpC => {
                let target = self.stack.pop_int(op)?;
                if self.stack.pop_int(op)? != 0 {
                    next = target;
                }
            }

            Opcode::JumpRC => {
                let offset = self.stack.pop_int(op)?;
                if self.stack.pop_int(op)? != 0 {
                    next = self.relative(offset, op)?;
                }
            }

            Opcode::Call => {
                let target = self.stack.pop_int(op)?;
                self.stack.push(Value::Int(self.fp))?;
                self.fp = stack_top(&self.stack);
                self.stack.push(Value::Int(self.pc + 1))?;
                next = target;
            }

            Opcode::Ret => {
                let retval = self.stack.pop()?;
                let saved_fp = self.int_at(self.fp, op)?;
                let return_pc = self.int_at(self.frame_slot(1, op)?, op)?;
                let frame = usize::try_from(self.fp).map_err(|_| VmError::IndexOutOfRange {
                    index: self.fp,
                    len: self.stack.len(),
                })?;
                self.stack.truncate(frame)?;

                if return_pc == -1 {
                    return Ok(Some(retval));
                }
                self.fp = saved_fp;
                next = return_pc;
                self.stack.push(retval)?;
            }

            // =================================================================
            // ARITHMETIC & LOGIC
            // =================================================================
            Opcode::Add => self.binary(op, i64::checked_add)?,
            Opcode::Sub => self.binary(op, i64::checked_sub)?,
            Opcode::Mul => self.binary(op, i64::checked_mul)?,
            Opcode::Div => self.binary(op, floor_div)?,
            Opcode::Mod => self.binary(op, floor_mod)?,
            Opcode::And => self.binary(op, |a, b| Some(a & b))?,
            Opcode::Or => self.binary(op, |a, b| Some(a | b))?,
            Opcode::Xor => self.binary(op, |a, b| Some(a ^ b))?,
            Opcode::Le => self.binary(op, |a, b| Some(i64::from(a <= b)))?,
            Opcode::Ge => self.binary(op, |a, b| Some(i64::from(a >= b)))?,
            Opcode::Lt => self.binary(op, |a, b| Some(i64::from(a < b)))?,
            Opcode::Gt => self.binary(op, |a, b| Some(i64::from(a > b)))?,

            Opcode::Neg => {
                let value = self.stack.pop_int(op)?;
                let negated = value.checked_neg().ok_or(VmError::Arithmetic { opcode: op })?;
                self.stack.push(Value::Int(negated))?;
            }

            Opcode::Not => match self.stack.pop_int(op)? {
                value @ (0 | 1) => self.stack.push(Value::Int(1 - value))?,
                value => return Err(VmError::InvalidOperand { opcode: op, value }),
            },

            Opcode::Equ => {
                let first = self.stack.pop()?;
                let second = self.stack.pop()?;
                self.stack.push((second == first).into())?;
            }

            // =================================================================
            // LISTS
            // =================================================================
            Opcode::Pack => {
                let n = self.stack.pop_index(op)?;
                let items = self.stack.pop_n(n)?;
                self.stack.push(Value::List(items))?;
            }

            Opcode::Unpack => {
                let items = self.stack.pop_list(op)?;
                let len = i64::try_from(items.len()).map_err(|_| VmError::Arithmetic { opcode: op })?;
                for item in items {
                    self.stack.push(item)?;
                }
                self.stack.push(Value::Int(len))?;
            }

            // =================================================================
            // ACCOUNTS & STATE
            // =================================================================
            Opcode::GetBal => {
                let target = self.stack.pop_hash(op)?;
                let balance = match self.state.get_account(&target)? {
                    Some(account) => balance_int(account.balance(), op)?,
                    None => -1,
                };
                self.stack.push(Value::Int(balance))?;
            }

            Opcode::GetOwnBal => {
                let balance = balance_int(self.acc.balance(), op)?;
                self.stack.push(Value::Int(balance))?;
            }

            Opcode::GetStor => {
                let name = self.stack.pop_str(op)?;
                let value = self
                    .acc
                    .get_storage(&name)
                    .cloned()
                    .ok_or(VmError::StorageNotFound(name))?;
                self.stack.push(value.into())?;
            }

            Opcode::SetStor => {
                let value = self.stack.pop()?.into_storage(op)?;
                let name = self.stack.pop_str(op)?;
                self.acc = self.acc.set_storage(&name, value)?;
                self.state = self.state.put_account(&self.acc)?;
            }

            Opcode::GetCode => {
                let target = self.stack.pop_hash(op)?;
                let account = self
                    .state
                    .get_account(&target)?
                    .ok_or(VmError::AccountNotFound(target))?;
                self.stack.push(Value::Str(account.code().to_string()))?;
            }

            Opcode::CreateContr => {
                let created = self.create_contract(op)?;
                self.stack.push(created.into())?;
            }

            Opcode::Transfer => {
                let amount = self.stack.pop_int(op)?;
                let target = self.stack.pop_hash(op)?;
                let params = self.stack.pop_list(op)?;
                if amount < 0 {
                    return Err(VmError::InvalidOperand {
                        opcode: op,
                        value: amount,
                    });
                }
                let transferred = self.transfer(params, target, amount)?;
                self.stack.push(transferred.into())?;
            }

            // =================================================================
            // TERMINATION
            // =================================================================
            Opcode::Kill => return Err(VmError::Killed),
        }

        self.pc = next;
        Ok(None)
    }

    /// Pop `first` then `second`, push `f(second, first)`.
    fn binary(&mut self, op: &'static str, f: impl Fn(i64, i64) -> Option<i64>) -> Result<(), VmError> {
        let first = self.stack.pop_int(op)?;
        let second = self.stack.pop_int(op)?;
        let result = f(second, first).ok_or(VmError::Arithmetic { opcode: op })?;
        self.stack.push(Value::Int(result))
    }

    fn frame_slot(&self, offset: i64, op: &'static str) -> Result<i64, VmError> {
        self.fp
            .checked_add(offset)
            .ok_or(VmError::Arithmetic { opcode: op })
    }

    fn relative(&self, offset: i64, op: &'static str) -> Result<i64, VmError> {
        self.pc
            .checked_add(offset)
            .ok_or(VmError::Arithmetic { opcode: op })
    }

    fn int_at(&self, index: i64, op: &'static str) -> Result<i64, VmError> {
        match self.stack.get(index)? {
            Value::Int(v) => Ok(*v),
            other => Err(VmError::TypeMismatch {
                opcode: op,
                expected: "int",
                actual: other.type_name(),
            }),
        }
    }

    /// `storage_values storage_names owner code pubkey` (pubkey on top).
    ///
    /// Returns false if an account already lives at the derived address.
    fn create_contract(&mut self, op: &'static str) -> Result<bool, VmError> {
        let pubkey = self.stack.pop_pubkey(op)?;
        let code = self.stack.pop_str(op)?;
        let owner_access = self.stack.pop_int(op)? != 0;
        let names = self.stack.pop_list(op)?;
        let values = self.stack.pop_list(op)?;

        if names.len() != values.len() {
            return Err(VmError::StorageArity {
                names: names.len(),
                values: values.len(),
            });
        }
        let created = address(&pubkey);
        if self.state.contains(&created)? {
            debug!(address = %created, "create: address taken");
            return Ok(false);
        }

        let storage = names
            .into_iter()
            .zip(values)
            .map(|(name, value)| -> Result<StorageItem, VmError> {
                match name {
                    Value::Str(name) => Ok(StorageItem::new(name, value.into_storage(op)?)),
                    other => Err(VmError::TypeMismatch {
                        opcode: op,
                        expected: "str",
                        actual: other.type_name(),
                    }),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let account = Account::new(pubkey, 0, code, owner_access, storage)?;
        self.state = self.state.put_account(&account)?;
        debug!(address = %created, "contract created");
        Ok(true)
    }

    /// Move `amount` to `target` and run its code.
    ///
    /// All-or-nothing: on a missing target, an insufficient balance or a
    /// failing callee the state is left as it was and false is returned.
    fn transfer(&mut self, params: Vec<Value>, target: Hash, amount: i64) -> Result<bool, VmError> {
        if !self.state.contains(&target)? {
            debug!(%target, "transfer: unknown target");
            return Ok(false);
        }
        let Ok(debited) = self.acc.add_to_balance(-amount) else {
            debug!(amount, balance = self.acc.balance(), "transfer: insufficient balance");
            return Ok(false);
        };

        let caller = self.acc.address();
        let state = self.state.put_account(&debited)?;
        let recipient = state
            .get_account(&target)?
            .ok_or(VmError::AccountNotFound(target))?;
        let Ok(credited) = recipient.add_to_balance(amount) else {
            return Ok(false);
        };
        let state = state.put_account(&credited)?;

        let transferred = if credited.has_code() {
            let nested = Vm::with_depth(
                state,
                Params::Values(params),
                credited,
                &[caller],
                amount,
                self.config,
                self.depth + 1,
                self.budget.saturating_sub(self.steps),
            );
            let outcome = nested.and_then(|mut vm| {
                let outcome = vm.drive();
                self.steps += vm.steps;
                outcome.map(|_| vm.state)
            });
            match outcome {
                Ok(state) => {
                    self.state = state;
                    true
                }
                Err(err) => {
                    debug!(%target, error = %err, "transfer: callee failed, rolled back");
                    false
                }
            }
        } else {
            self.state = state;
            true
        };

        self.acc = self
            .state
            .get_account(&caller)?
            .ok_or(VmError::AccountNotFound(caller))?;
        Ok(transferred)
    }
}

fn stack_len(stack: &Stack) -> i64 {
    // The stack is capped far below i64::MAX.
    stack.len() as i64
}

fn stack_top(stack: &Stack) -> i64 {
    stack_len(stack) - 1
}

fn balance_int(balance: u64, op: &'static str) -> Result<i64, VmError> {
    i64::try_from(balance).map_err(|_| VmError::Arithmetic { opcode: op })
}

/// Division rounding toward negative infinity.
fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q.checked_sub(1)
    } else {
        Some(q)
    }
}

/// Remainder with the sign of the divisor.
fn floor_mod(a: i64, b: i64) -> Option<i64> {
    let r = a.checked_rem(b)?;
    if r != 0 && ((r < 0) != (b < 0)) {
        Some(r + b)
    } else {
        Some(r)
    }
}

// =============================================================================
// TESTS
// =============================================================================
