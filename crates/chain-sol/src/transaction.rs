//! Solana legacy transaction wire format.
//!
//! Transactions are assembled by hand rather than through `solana-sdk`.
//! The layout:
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16
//!   signatures              64 bytes * num_signatures
//!   message:
//!     num_required_sigs     u8
//!     num_readonly_signed   u8
//!     num_readonly_unsigned u8
//!     num_accounts          compact-u16
//!     account_keys          32 bytes * num_accounts
//!     recent_blockhash      32 bytes
//!     num_instructions      compact-u16
//!     instructions[]        (see below)
//!
//! Instruction:
//!   program_id_index        u8
//!   num_accounts            compact-u16
//!   account_indices         u8 * num_accounts
//!   data_len                compact-u16
//!   data                    u8 * data_len
//! ```
//!
//! Signing is never done with a user's key here. A [`SignedSolTransaction`]
//! carries one signature slot per required signer; wallets fill their slot
//! through [`crate::signer::TransactionSigner`], and ephemeral keys created
//! by this crate (a fresh mint account) fill theirs with
//! [`SignedSolTransaction::sign_with`].

use ed25519_dalek::{Signer, SigningKey};

use crate::address::bytes_to_address;
use crate::error::SolError;

/// The Solana System Program public key: 32 zero bytes.
/// Base58: `11111111111111111111111111111111`
pub const SYSTEM_PROGRAM_ID: [u8; 32] = [0u8; 32];

/// System Program `CreateAccount` instruction index (little-endian u32).
const SYSTEM_CREATE_ACCOUNT_IX_INDEX: u32 = 0;

const SIGNATURE_LEN: usize = 64;

// ---------------------------------------------------------------------------
// Compact-u16 encoding
// ---------------------------------------------------------------------------

/// Encode a `u16` value in Solana's compact-u16 format.
///
/// - Values 0..0x7f       -> 1 byte
/// - Values 0x80..0x3fff  -> 2 bytes
/// - Values 0x4000..      -> 3 bytes
pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut val = value as u32;
    let mut out = Vec::with_capacity(3);

    loop {
        let mut byte = (val & 0x7f) as u8;
        val >>= 7;
        if val > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if val == 0 {
            break;
        }
    }

    out
}

/// Decode a compact-u16 value from a byte slice.
///
/// Returns `(value, bytes_consumed)` or an error if the data is truncated.
pub fn decode_compact_u16(data: &[u8]) -> Result<(u16, usize), SolError> {
    let mut value: u32 = 0;
    let mut shift = 0u32;
    let mut consumed = 0usize;

    loop {
        let byte = *data.get(consumed).ok_or_else(|| {
            SolError::SerializationError(
                "unexpected end of data while decoding compact-u16".into(),
            )
        })?;
        consumed += 1;

        value |= ((byte & 0x7f) as u32) << shift;
        shift += 7;

        if byte & 0x80 == 0 || consumed >= 3 {
            break;
        }
    }

    let value = u16::try_from(value)
        .map_err(|_| SolError::SerializationError("compact-u16 value overflow".into()))?;
    Ok((value, consumed))
}

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// A single account reference in a Solana instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolAccountMeta {
    pub pubkey: [u8; 32],
    pub is_signer: bool,
    pub is_writable: bool,
}

impl SolAccountMeta {
    pub fn writable(pubkey: [u8; 32], is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    pub fn readonly(pubkey: [u8; 32], is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// A Solana instruction (before it is compiled into a transaction).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolInstruction {
    pub program_id: [u8; 32],
    pub accounts: Vec<SolAccountMeta>,
    pub data: Vec<u8>,
}

/// A compiled transaction message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolTransaction {
    /// All account keys referenced by this transaction, in canonical order:
    ///   1. writable signers (fee payer first)
    ///   2. read-only signers
    ///   3. writable non-signers
    ///   4. read-only non-signers
    pub account_keys: Vec<[u8; 32]>,

    pub num_required_signatures: u8,
    pub num_readonly_signed: u8,
    pub num_readonly_unsigned: u8,

    pub recent_blockhash: [u8; 32],

    pub compiled_instructions: Vec<CompiledInstruction>,
}

/// A compiled instruction where account references are replaced by u8 indices
/// into the transaction's `account_keys` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

impl SolTransaction {
    /// The fee payer (always account index 0).
    pub fn fee_payer(&self) -> Option<&[u8; 32]> {
        self.account_keys.first()
    }

    /// The accounts that must sign, in signature-slot order.
    pub fn signers(&self) -> &[[u8; 32]] {
        let n = (self.num_required_signatures as usize).min(self.account_keys.len());
        &self.account_keys[..n]
    }

    /// Program ID of the compiled instruction at `index`.
    pub fn program_of(&self, index: usize) -> Option<&[u8; 32]> {
        self.compiled_instructions
            .get(index)
            .and_then(|ix| self.account_keys.get(ix.program_id_index as usize))
    }

    /// Resolve the account keys referenced by the instruction at `index`.
    pub fn instruction_accounts(&self, index: usize) -> Vec<[u8; 32]> {
        self.compiled_instructions
            .get(index)
            .map(|ix| {
                ix.account_indices
                    .iter()
                    .filter_map(|i| self.account_keys.get(*i as usize).copied())
                    .collect()
            })
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Transaction building
// ---------------------------------------------------------------------------

/// Compile a set of instructions with a single fee payer into a message.
///
/// The fee payer is always the first signer and is placed at index 0 in the
/// account keys.
pub fn compile_transaction(
    instructions: &[SolInstruction],
    fee_payer: &[u8; 32],
    recent_blockhash: &[u8; 32],
) -> Result<SolTransaction, SolError> {
    if instructions.is_empty() {
        return Err(SolError::TransactionBuildError(
            "transaction has no instructions".into(),
        ));
    }

    struct AccountEntry {
        pubkey: [u8; 32],
        is_signer: bool,
        is_writable: bool,
    }

    let mut entries: Vec<AccountEntry> = Vec::new();

    let mut upsert = |pubkey: [u8; 32], signer: bool, writable: bool| {
        if let Some(entry) = entries.iter_mut().find(|e| e.pubkey == pubkey) {
            entry.is_signer |= signer;
            entry.is_writable |= writable;
        } else {
            entries.push(AccountEntry {
                pubkey,
                is_signer: signer,
                is_writable: writable,
            });
        }
    };

    upsert(*fee_payer, true, true);

    for ix in instructions {
        for meta in &ix.accounts {
            upsert(meta.pubkey, meta.is_signer, meta.is_writable);
        }
        upsert(ix.program_id, false, false);
    }

    // Stable sort keeps insertion order inside each category, so the fee
    // payer (inserted first as a writable signer) stays at index 0.
    entries.sort_by_key(|e| match (e.is_signer, e.is_writable) {
        (true, true) => 0u8,
        (true, false) => 1,
        (false, true) => 2,
        (false, false) => 3,
    });

    if entries.len() > u8::MAX as usize {
        return Err(SolError::TransactionBuildError(format!(
            "too many accounts: {}",
            entries.len()
        )));
    }

    let num_signers = entries.iter().filter(|e| e.is_signer).count() as u8;
    let num_readonly_signed = entries
        .iter()
        .filter(|e| e.is_signer && !e.is_writable)
        .count() as u8;
    let num_readonly_unsigned = entries
        .iter()
        .filter(|e| !e.is_signer && !e.is_writable)
        .count() as u8;

    let account_keys: Vec<[u8; 32]> = entries.iter().map(|e| e.pubkey).collect();

    let index_of = |key: &[u8; 32], what: &str| -> Result<u8, SolError> {
        account_keys
            .iter()
            .position(|k| k == key)
            .map(|i| i as u8)
            .ok_or_else(|| SolError::TransactionBuildError(format!("{what} not in account keys")))
    };

    let mut compiled = Vec::with_capacity(instructions.len());
    for ix in instructions {
        let program_id_index = index_of(&ix.program_id, "program_id")?;
        let account_indices = ix
            .accounts
            .iter()
            .map(|meta| index_of(&meta.pubkey, "account"))
            .collect::<Result<Vec<u8>, SolError>>()?;

        compiled.push(CompiledInstruction {
            program_id_index,
            account_indices,
            data: ix.data.clone(),
        });
    }

    Ok(SolTransaction {
        account_keys,
        num_required_signatures: num_signers,
        num_readonly_signed,
        num_readonly_unsigned,
        recent_blockhash: *recent_blockhash,
        compiled_instructions: compiled,
    })
}

/// Serialize the transaction message (the bytes that get signed).
pub fn serialize_message(tx: &SolTransaction) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256);

    buf.push(tx.num_required_signatures);
    buf.push(tx.num_readonly_signed);
    buf.push(tx.num_readonly_unsigned);

    buf.extend_from_slice(&encode_compact_u16(tx.account_keys.len() as u16));
    for key in &tx.account_keys {
        buf.extend_from_slice(key);
    }

    buf.extend_from_slice(&tx.recent_blockhash);

    buf.extend_from_slice(&encode_compact_u16(
        tx.compiled_instructions.len() as u16
    ));
    for ix in &tx.compiled_instructions {
        buf.push(ix.program_id_index);

        buf.extend_from_slice(&encode_compact_u16(ix.account_indices.len() as u16));
        buf.extend_from_slice(&ix.account_indices);

        buf.extend_from_slice(&encode_compact_u16(ix.data.len() as u16));
        buf.extend_from_slice(&ix.data);
    }

    buf
}

/// Parse a serialized message back into a [`SolTransaction`].
pub fn deserialize_message(data: &[u8]) -> Result<SolTransaction, SolError> {
    let mut reader = Reader::new(data);

    let num_required_signatures = reader.u8()?;
    let num_readonly_signed = reader.u8()?;
    let num_readonly_unsigned = reader.u8()?;

    let num_accounts = reader.compact_u16()?;
    let mut account_keys = Vec::with_capacity(num_accounts as usize);
    for _ in 0..num_accounts {
        account_keys.push(reader.array32()?);
    }

    let recent_blockhash = reader.array32()?;

    let num_instructions = reader.compact_u16()?;
    let mut compiled_instructions = Vec::with_capacity(num_instructions as usize);
    for _ in 0..num_instructions {
        let program_id_index = reader.u8()?;
        let n = reader.compact_u16()? as usize;
        let account_indices = reader.take(n)?.to_vec();
        let len = reader.compact_u16()? as usize;
        let data = reader.take(len)?.to_vec();
        compiled_instructions.push(CompiledInstruction {
            program_id_index,
            account_indices,
            data,
        });
    }

    if !reader.is_empty() {
        return Err(SolError::SerializationError(
            "trailing bytes after message".into(),
        ));
    }

    Ok(SolTransaction {
        account_keys,
        num_required_signatures,
        num_readonly_signed,
        num_readonly_unsigned,
        recent_blockhash,
        compiled_instructions,
    })
}

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

/// A message plus one signature slot per required signer.
///
/// Empty slots hold 64 zero bytes, which is also how the wire format
/// represents a missing signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedSolTransaction {
    pub message: SolTransaction,
    pub signatures: Vec<[u8; SIGNATURE_LEN]>,
}

impl SignedSolTransaction {
    /// Wrap a message with empty signature slots.
    pub fn new(message: SolTransaction) -> Self {
        let slots = message.signers().len();
        Self {
            message,
            signatures: vec![[0u8; SIGNATURE_LEN]; slots],
        }
    }

    /// The bytes every signer signs.
    pub fn message_bytes(&self) -> Vec<u8> {
        serialize_message(&self.message)
    }

    /// Place `signature` in the slot belonging to `signer`.
    pub fn add_signature(
        &mut self,
        signer: &[u8; 32],
        signature: [u8; SIGNATURE_LEN],
    ) -> Result<(), SolError> {
        let slot = self
            .message
            .signers()
            .iter()
            .position(|k| k == signer)
            .ok_or_else(|| {
                SolError::SigningError(format!(
                    "{} is not a required signer",
                    bytes_to_address(signer)
                ))
            })?;
        self.signatures[slot] = signature;
        Ok(())
    }

    /// Sign with a locally held Ed25519 key (used for freshly generated
    /// accounts such as a new mint, never for the wallet owner).
    pub fn sign_with(&mut self, key: &SigningKey) -> Result<(), SolError> {
        let pubkey = key.verifying_key().to_bytes();
        let signature = key.sign(&self.message_bytes());
        self.add_signature(&pubkey, signature.to_bytes())
    }

    /// Whether every signature slot has been filled.
    pub fn is_fully_signed(&self) -> bool {
        self.signatures.len() == self.message.signers().len()
            && self.signatures.iter().all(|s| s.iter().any(|b| *b != 0))
    }

    /// The transaction signature (fee payer's signature, Base58), which is
    /// the ID the network uses for the transaction.
    pub fn signature(&self) -> Option<String> {
        self.signatures
            .first()
            .filter(|s| s.iter().any(|b| *b != 0))
            .map(|s| bs58::encode(s).into_string())
    }

    /// Serialize to the wire format accepted by `sendTransaction`.
    pub fn to_wire(&self) -> Vec<u8> {
        let message = self.message_bytes();
        let mut wire =
            Vec::with_capacity(3 + self.signatures.len() * SIGNATURE_LEN + message.len());
        wire.extend_from_slice(&encode_compact_u16(self.signatures.len() as u16));
        for sig in &self.signatures {
            wire.extend_from_slice(sig);
        }
        wire.extend_from_slice(&message);
        wire
    }

    /// Parse a wire-format transaction.
    pub fn from_wire(raw_tx: &[u8]) -> Result<Self, SolError> {
        let (num_sigs, offset) = decode_compact_u16(raw_tx)?;
        let sigs_end = offset + num_sigs as usize * SIGNATURE_LEN;
        if sigs_end > raw_tx.len() {
            return Err(SolError::SerializationError(
                "transaction too short: signature slots exceed length".into(),
            ));
        }

        let signatures = raw_tx[offset..sigs_end]
            .chunks_exact(SIGNATURE_LEN)
            .map(|chunk| {
                let mut sig = [0u8; SIGNATURE_LEN];
                sig.copy_from_slice(chunk);
                sig
            })
            .collect::<Vec<_>>();

        let message = deserialize_message(&raw_tx[sigs_end..])?;
        if message.num_required_signatures as usize != signatures.len() {
            return Err(SolError::SerializationError(format!(
                "header requires {} signatures, found {}",
                message.num_required_signatures,
                signatures.len()
            )));
        }

        Ok(Self {
            message,
            signatures,
        })
    }
}

// ---------------------------------------------------------------------------
// System Program
// ---------------------------------------------------------------------------

/// Build a System Program `CreateAccount` instruction.
///
/// Both `from` (funding) and `new_account` must sign.
pub fn build_create_account_instruction(
    from: &[u8; 32],
    new_account: &[u8; 32],
    lamports: u64,
    space: u64,
    owner: &[u8; 32],
) -> SolInstruction {
    // u32 LE index + u64 LE lamports + u64 LE space + 32-byte owner.
    let mut data = Vec::with_capacity(52);
    data.extend_from_slice(&SYSTEM_CREATE_ACCOUNT_IX_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());
    data.extend_from_slice(&space.to_le_bytes());
    data.extend_from_slice(owner);

    SolInstruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(*from, true),
            SolAccountMeta::writable(*new_account, true),
        ],
        data,
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], SolError> {
        let end = self.pos + n;
        let slice = self.data.get(self.pos..end).ok_or_else(|| {
            SolError::SerializationError("transaction message truncated".into())
        })?;
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, SolError> {
        Ok(self.take(1)?[0])
    }

    fn array32(&mut self) -> Result<[u8; 32], SolError> {
        let mut out = [0u8; 32];
        out.copy_from_slice(self.take(32)?);
        Ok(out)
    }

    fn compact_u16(&mut self) -> Result<u16, SolError> {
        let (value, consumed) = decode_compact_u16(&self.data[self.pos..])?;
        self.pos += consumed;
        Ok(value)
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_ix(program: u8, accounts: Vec<SolAccountMeta>) -> SolInstruction {
        SolInstruction {
            program_id: [program; 32],
            accounts,
            data: vec![1, 2, 3],
        }
    }

    // -- compact-u16 --------------------------------------------------------

    #[test]
    fn compact_u16_boundaries() {
        assert_eq!(encode_compact_u16(0), vec![0x00]);
        assert_eq!(encode_compact_u16(0x7f), vec![0x7f]);
        assert_eq!(encode_compact_u16(128), vec![0x80, 0x01]);
        assert_eq!(encode_compact_u16(16383), vec![0xff, 0x7f]);
        assert_eq!(encode_compact_u16(16384), vec![0x80, 0x80, 0x01]);
    }

    #[test]
    fn compact_u16_decode_reports_consumed_bytes() {
        assert_eq!(decode_compact_u16(&[0x80, 0x01, 0xff]).unwrap(), (128, 2));
        assert_eq!(decode_compact_u16(&[0xff, 0xff, 0x03]).unwrap(), (0xffff, 3));
    }

    #[test]
    fn compact_u16_decode_truncated() {
        assert!(decode_compact_u16(&[]).is_err());
        assert!(decode_compact_u16(&[0x80]).is_err());
    }

    // -- compile ------------------------------------------------------------

    #[test]
    fn fee_payer_is_first_account() {
        let payer = [9u8; 32];
        let ix = dummy_ix(
            7,
            vec![
                SolAccountMeta::writable([1u8; 32], false),
                SolAccountMeta::readonly([2u8; 32], false),
            ],
        );
        let tx = compile_transaction(&[ix], &payer, &[0xAA; 32]).unwrap();
        assert_eq!(tx.fee_payer(), Some(&payer));
        assert_eq!(tx.num_required_signatures, 1);
    }

    #[test]
    fn accounts_are_sorted_by_role() {
        let payer = [9u8; 32];
        let ix = dummy_ix(
            7,
            vec![
                SolAccountMeta::readonly([1u8; 32], false),
                SolAccountMeta::writable([2u8; 32], false),
                SolAccountMeta::readonly([3u8; 32], true),
            ],
        );
        let tx = compile_transaction(&[ix], &payer, &[0u8; 32]).unwrap();

        // payer (w,s), [3] (r,s), [2] (w), [1] (r), program (r)
        assert_eq!(tx.account_keys[0], payer);
        assert_eq!(tx.account_keys[1], [3u8; 32]);
        assert_eq!(tx.account_keys[2], [2u8; 32]);
        assert_eq!(tx.num_required_signatures, 2);
        assert_eq!(tx.num_readonly_signed, 1);
        assert_eq!(tx.num_readonly_unsigned, 2);
    }

    #[test]
    fn duplicate_accounts_merge_permissions() {
        let payer = [9u8; 32];
        let shared = [4u8; 32];
        let a = dummy_ix(7, vec![SolAccountMeta::readonly(shared, false)]);
        let b = dummy_ix(7, vec![SolAccountMeta::writable(shared, false)]);
        let tx = compile_transaction(&[a, b], &payer, &[0u8; 32]).unwrap();

        // payer, shared (now writable), program.
        assert_eq!(tx.account_keys.len(), 3);
        assert_eq!(tx.account_keys[1], shared);
        assert_eq!(tx.num_readonly_unsigned, 1);
    }

    #[test]
    fn empty_instruction_list_is_rejected() {
        assert!(compile_transaction(&[], &[1u8; 32], &[0u8; 32]).is_err());
    }

    #[test]
    fn instruction_accounts_resolve_back_to_keys() {
        let payer = [9u8; 32];
        let ix = dummy_ix(7, vec![SolAccountMeta::writable([5u8; 32], false)]);
        let tx = compile_transaction(&[ix], &payer, &[0u8; 32]).unwrap();
        assert_eq!(tx.instruction_accounts(0), vec![[5u8; 32]]);
        assert_eq!(tx.program_of(0), Some(&[7u8; 32]));
        assert!(tx.instruction_accounts(3).is_empty());
    }

    // -- message serialization ---------------------------------------------

    #[test]
    fn message_parses_back() {
        let payer = [9u8; 32];
        let ix = dummy_ix(7, vec![SolAccountMeta::writable([1u8; 32], false)]);
        let tx = compile_transaction(&[ix], &payer, &[0xAB; 32]).unwrap();
        let bytes = serialize_message(&tx);
        assert_eq!(deserialize_message(&bytes).unwrap(), tx);
    }

    #[test]
    fn message_with_trailing_bytes_is_rejected() {
        let tx = compile_transaction(&[dummy_ix(7, vec![])], &[9u8; 32], &[0u8; 32]).unwrap();
        let mut bytes = serialize_message(&tx);
        bytes.push(0);
        assert!(deserialize_message(&bytes).is_err());
    }

    // -- signatures ----------------------------------------------------------

    #[test]
    fn unsigned_transaction_has_no_signature() {
        let tx = compile_transaction(&[dummy_ix(7, vec![])], &[9u8; 32], &[0u8; 32]).unwrap();
        let signed = SignedSolTransaction::new(tx);
        assert_eq!(signed.signatures.len(), 1);
        assert!(!signed.is_fully_signed());
        assert!(signed.signature().is_none());
    }

    #[test]
    fn sign_with_fills_matching_slot() {
        let key = SigningKey::from_bytes(&[7u8; 32]);
        let payer = key.verifying_key().to_bytes();
        let tx = compile_transaction(&[dummy_ix(3, vec![])], &payer, &[1u8; 32]).unwrap();

        let mut signed = SignedSolTransaction::new(tx);
        signed.sign_with(&key).unwrap();

        assert!(signed.is_fully_signed());
        let sig = signed.signature().unwrap();
        assert_eq!(bs58::decode(sig).into_vec().unwrap().len(), 64);
    }

    #[test]
    fn signing_with_a_non_signer_fails() {
        let tx = compile_transaction(&[dummy_ix(3, vec![])], &[9u8; 32], &[1u8; 32]).unwrap();
        let mut signed = SignedSolTransaction::new(tx);
        let stranger = SigningKey::from_bytes(&[1u8; 32]);
        assert!(signed.sign_with(&stranger).is_err());
    }

    #[test]
    fn wire_format_parses_back() {
        let key = SigningKey::from_bytes(&[3u8; 32]);
        let payer = key.verifying_key().to_bytes();
        let ix = dummy_ix(5, vec![SolAccountMeta::writable([8u8; 32], false)]);
        let tx = compile_transaction(&[ix], &payer, &[2u8; 32]).unwrap();
        let mut signed = SignedSolTransaction::new(tx);
        signed.sign_with(&key).unwrap();

        let wire = signed.to_wire();
        assert_eq!(wire[0], 1);
        assert_eq!(SignedSolTransaction::from_wire(&wire).unwrap(), signed);
    }

    #[test]
    fn wire_with_missing_signature_slots_is_rejected() {
        let tx = compile_transaction(&[dummy_ix(5, vec![])], &[9u8; 32], &[2u8; 32]).unwrap();
        let mut wire = encode_compact_u16(0);
        wire.extend_from_slice(&serialize_message(&tx));
        assert!(SignedSolTransaction::from_wire(&wire).is_err());
    }

    // -- system program ------------------------------------------------------

    #[test]
    fn create_account_layout() {
        let ix = build_create_account_instruction(
            &[1u8; 32],
            &[2u8; 32],
            1_461_600,
            82,
            &[3u8; 32],
        );
        assert_eq!(ix.program_id, SYSTEM_PROGRAM_ID);
        assert_eq!(ix.data.len(), 52);
        assert_eq!(&ix.data[..4], &0u32.to_le_bytes());
        assert_eq!(&ix.data[4..12], &1_461_600u64.to_le_bytes());
        assert_eq!(&ix.data[12..20], &82u64.to_le_bytes());
        assert_eq!(&ix.data[20..], &[3u8; 32]);
        assert!(ix.accounts.iter().all(|a| a.is_signer && a.is_writable));
    }
}
