//! Log record types
//!
//! Every mutation of the student table is framed as:
//!
//! ```text
//! +------------------+
//! | Record Length    | (u32 LE, whole record including this field)
//! +------------------+
//! | Op               | (u8: 1 = put, 2 = delete, 3 = clear)
//! +------------------+
//! | Student Id       | (u64 LE, 0 for clear)
//! +------------------+
//! | Body             | (u32 LE length + JSON bytes, empty unless put)
//! +------------------+
//! | Checksum         | (u32 LE)
//! +------------------+
//! ```
//!
//! Checksum covers all bytes except the checksum itself.

use std::io;

use super::checksum::compute_checksum;
use crate::students::{Student, StudentId};

/// Smallest well-formed record: length + op + id + empty body + checksum
pub const MIN_RECORD_SIZE: usize = 4 + 1 + 8 + 4 + 4;

const OP_PUT: u8 = 1;
const OP_DELETE: u8 = 2;
const OP_CLEAR: u8 = 3;

/// A single change to the student table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Insert or overwrite the full row
    Put(Student),
    /// Remove the row with this id
    Delete(StudentId),
    /// Remove every row
    Clear,
}

impl Mutation {
    fn op(&self) -> u8 {
        match self {
            Mutation::Put(_) => OP_PUT,
            Mutation::Delete(_) => OP_DELETE,
            Mutation::Clear => OP_CLEAR,
        }
    }

    fn student_id(&self) -> StudentId {
        match self {
            Mutation::Put(student) => student.id,
            Mutation::Delete(id) => *id,
            Mutation::Clear => 0,
        }
    }

    /// Serialize to the on-disk record format.
    pub fn serialize(&self) -> io::Result<Vec<u8>> {
        let body = match self {
            Mutation::Put(student) => serde_json::to_vec(student)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?,
            Mutation::Delete(_) | Mutation::Clear => Vec::new(),
        };

        let record_length = (MIN_RECORD_SIZE + body.len()) as u32;

        let mut record = Vec::with_capacity(record_length as usize);
        record.extend_from_slice(&record_length.to_le_bytes());
        record.push(self.op());
        record.extend_from_slice(&self.student_id().to_le_bytes());
        record.extend_from_slice(&(body.len() as u32).to_le_bytes());
        record.extend_from_slice(&body);

        let checksum = compute_checksum(&record);
        record.extend_from_slice(&checksum.to_le_bytes());

        Ok(record)
    }

    /// Deserialize a record from bytes, verifying checksum.
    ///
    /// Returns the mutation and the number of bytes consumed.
    pub fn deserialize(data: &[u8]) -> io::Result<(Self, usize)> {
        if data.len() < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Record too short",
            ));
        }

        let record_length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

        if record_length < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid record length: {}", record_length),
            ));
        }

        if data.len() < record_length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "Record truncated: expected {} bytes, got {}",
                    record_length,
                    data.len()
                ),
            ));
        }

        let checksum_offset = record_length - 4;
        let stored_checksum = u32::from_le_bytes([
            data[checksum_offset],
            data[checksum_offset + 1],
            data[checksum_offset + 2],
            data[checksum_offset + 3],
        ]);
        let computed_checksum = compute_checksum(&data[..checksum_offset]);

        if computed_checksum != stored_checksum {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Checksum mismatch: computed {:08x}, stored {:08x}",
                    computed_checksum, stored_checksum
                ),
            ));
        }

        let op = data[4];
        let mut id_buf = [0u8; 8];
        id_buf.copy_from_slice(&data[5..13]);
        let student_id = u64::from_le_bytes(id_buf);

        let body_len = u32::from_le_bytes([data[13], data[14], data[15], data[16]]) as usize;
        if 17 + body_len != checksum_offset {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Body length {} does not match record length {}",
                    body_len, record_length
                ),
            ));
        }
        let body = &data[17..checksum_offset];

        let mutation = match op {
            OP_PUT => {
                let student: Student = serde_json::from_slice(body)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                if student.id != student_id {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!(
                            "Record id {} does not match body id {}",
                            student_id, student.id
                        ),
                    ));
                }
                Mutation::Put(student)
            }
            OP_DELETE => Mutation::Delete(student_id),
            OP_CLEAR => Mutation::Clear,
            other => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Unknown op: {}", other),
                ))
            }
        };

        Ok((mutation, record_length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::students::NewStudent;

    fn sample_put() -> Mutation {
        Mutation::Put(Student::from_candidate(
            4,
            NewStudent::new("Ana", "Lee", "ana@x.com", 20),
        ))
    }

    #[test]
    fn test_put_record_layout() {
        let bytes = sample_put().serialize().unwrap();
        let record_length = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;

        assert_eq!(record_length, bytes.len());
        assert_eq!(bytes[4], OP_PUT);
        assert!(bytes.len() > MIN_RECORD_SIZE);

        let (decoded, consumed) = Mutation::deserialize(&bytes).unwrap();
        assert_eq!(decoded, sample_put());
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn test_clear_record_is_minimal() {
        let bytes = Mutation::Clear.serialize().unwrap();
        assert_eq!(bytes.len(), MIN_RECORD_SIZE);
    }

    #[test]
    fn test_checksum_detects_corruption() {
        let mut bytes = sample_put().serialize().unwrap();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xFF;

        let err = Mutation::deserialize(&bytes).unwrap_err();
        assert!(err.to_string().contains("Checksum mismatch"));
    }

    #[test]
    fn test_truncated_record_rejected() {
        let bytes = Mutation::Delete(9).serialize().unwrap();
        let err = Mutation::deserialize(&bytes[..bytes.len() - 1]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_consumes_only_first_record() {
        let mut bytes = Mutation::Delete(1).serialize().unwrap();
        let first_len = bytes.len();
        bytes.extend(Mutation::Clear.serialize().unwrap());

        let (decoded, consumed) = Mutation::deserialize(&bytes).unwrap();
        assert_eq!(decoded, Mutation::Delete(1));
        assert_eq!(consumed, first_len);
    }
}
