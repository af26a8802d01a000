use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

const TAG_LEAF: u16 = 0;
const TAG_SPLIT: u16 = 1;

/// A single tree node. Leaves hold the fraction of low-risk samples
/// they were grown from, so a traversal yields a probability rather
/// than a bare label.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn probability(&self, x: &[f64]) -> f64 {
        match self {
            Node::Leaf(p) => *p,
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if x[*feature] < *threshold {
                    left.probability(x)
                } else {
                    right.probability(x)
                }
            }
        }
    }

    pub fn encode<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        match self {
            Node::Leaf(p) => {
                writer.write_u16::<BigEndian>(TAG_LEAF)?;
                writer.write_f64::<BigEndian>(*p)?;
            }
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                writer.write_u16::<BigEndian>(TAG_SPLIT)?;
                writer.write_u16::<BigEndian>(*feature as u16)?;
                writer.write_f64::<BigEndian>(*threshold)?;
                left.encode(writer)?;
                right.encode(writer)?;
            }
        }

        Ok(())
    }

    pub fn decode<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        match reader.read_u16::<BigEndian>()? {
            TAG_LEAF => Ok(Node::Leaf(reader.read_f64::<BigEndian>()?)),
            TAG_SPLIT => {
                let feature = reader.read_u16::<BigEndian>()? as usize;
                let threshold = reader.read_f64::<BigEndian>()?;
                let left = Box::new(Node::decode(reader)?);
                let right = Box::new(Node::decode(reader)?);

                Ok(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                })
            }
            tag => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("unknown node tag {}", tag),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Node {
        Node::Split {
            feature: 0,
            threshold: 30_000.0,
            left: Box::new(Node::Leaf(0.0)),
            right: Box::new(Node::Leaf(1.0)),
        }
    }

    #[test]
    fn traversal_follows_threshold() {
        let tree = sample_tree();
        assert_eq!(tree.probability(&[10_000.0, 2.0]), 0.0);
        assert_eq!(tree.probability(&[50_000.0, 5.0]), 1.0);
    }

    #[test]
    fn encode_decode_round_trips() {
        let tree = sample_tree();
        let mut buffer = Vec::new();
        tree.encode(&mut buffer).unwrap();

        let decoded = Node::decode(&mut buffer.as_slice()).unwrap();
        assert_eq!(decoded, tree);
    }

    #[test]
    fn decode_rejects_unknown_tag() {
        let bytes = [0xffu8, 0xff];
        assert!(Node::decode(&mut bytes.as_ref()).is_err());
    }
}
