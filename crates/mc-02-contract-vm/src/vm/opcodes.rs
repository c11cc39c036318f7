//! # Opcodes
//!
//! Opcode names as they appear in program text. Matching is
//! case-insensitive: `op_add`, `Op_Add` and `OP_ADD` are the same opcode.

use std::fmt;

macro_rules! opcodes {
    ($($(#[$meta:meta])* $variant:ident => $name:literal,)*) => {
        /// Script opcode.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum Opcode {
            $($(#[$meta])* $variant,)*
        }

        impl Opcode {
            /// Every opcode, in table order.
            pub const ALL: &'static [Opcode] = &[$(Opcode::$variant,)*];

            /// Canonical uppercase name.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Opcode::$variant => $name,)*
                }
            }
        }
    };
}

opcodes! {
    // Crypto
    /// `str → Hash`
    Sha256 => "OP_SHA256",
    /// `any → Hash` of the value's byte encoding
    Hash => "OP_HASH",
    PubkeyFromKeypair => "OP_PUBKEYFROMKEYPAIR",
    /// `pubkey hash signature → 0|1`
    VerifySign => "OP_VERIFYSIGN",
    /// `seed → Pubkey`
    GenPubkey => "OP_GENPUBKEY",

    // Stack
    Dup => "OP_DUP",
    Swap => "OP_SWAP",
    SwapAny => "OP_SWAPANY",
    PushAbs => "OP_PUSHABS",
    PopAbs => "OP_POPABS",
    PushFp => "OP_PUSHFP",
    PopFp => "OP_POPFP",
    PushSp => "OP_PUSHSP",
    PopSp => "OP_POPSP",
    PopVoid => "OP_POPVOID",
    PushPc => "OP_PUSHPC",

    // Frame-relative
    PushR => "OP_PUSHR",
    PopR => "OP_POPR",
    IncFp => "OP_INCFP",

    // Control flow
    Jump => "OP_JUMP",
    JumpR => "OP_JUMPR",
    JumpC => "OP_JUMPC",
    JumpRC => "OP_JUMPRC",
    Call => "OP_CALL",
    Ret => "OP_RET",

    // Arithmetic and logic
    Add => "OP_ADD",
    Sub => "OP_SUB",
    Mul => "OP_MUL",
    Div => "OP_DIV",
    Mod => "OP_MOD",
    And => "OP_AND",
    Or => "OP_OR",
    Xor => "OP_XOR",
    Neg => "OP_NEG",
    Not => "OP_NOT",
    Equ => "OP_EQU",
    Le => "OP_LE",
    Ge => "OP_GE",
    Lt => "OP_LT",
    Gt => "OP_GT",

    // Lists
    Pack => "OP_PACK",
    Unpack => "OP_UNPACK",

    // Accounts and state
    GetBal => "OP_GETBAL",
    GetOwnBal => "OP_GETOWNBAL",
    GetStor => "OP_GETSTOR",
    SetStor => "OP_SETSTOR",
    GetCode => "OP_GETCODE",
    CreateContr => "OP_CREATECONTR",
    Transfer => "OP_TRANSFER",

    // Termination
    Kill => "OP_KILL",
}

impl Opcode {
    /// Look up an opcode by name, ignoring case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.name().eq_ignore_ascii_case(name))
    }

    /// Returns true if this opcode reads or writes accounts.
    #[must_use]
    pub fn touches_state(self) -> bool {
        matches!(
            self,
            Self::GetBal
                | Self::GetOwnBal
                | Self::GetStor
                | Self::SetStor
                | Self::GetCode
                | Self::CreateContr
                | Self::Transfer
        )
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_from_name() {
        assert_eq!(Opcode::from_name("OP_ADD"), Some(Opcode::Add));
        assert_eq!(Opcode::from_name("op_pushr"), Some(Opcode::PushR));
        assert_eq!(Opcode::from_name("Op_JumpRC"), Some(Opcode::JumpRC));
        assert_eq!(Opcode::from_name("OP_NOPE"), None);
        assert_eq!(Opcode::from_name("ADD"), None);
    }

    #[test]
    fn test_names_are_unique_and_roundtrip() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::from_name(op.name()), Some(*op));
            assert!(op.name().starts_with("OP_"));
        }
        let mut names: Vec<_> = Opcode::ALL.iter().map(|op| op.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Opcode::ALL.len());
    }

    #[test]
    fn test_touches_state() {
        assert!(Opcode::Transfer.touches_state());
        assert!(Opcode::GetBal.touches_state());
        assert!(!Opcode::Add.touches_state());
    }
}
