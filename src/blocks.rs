use crate::content::BlockContent;
use crate::errors::{AppError, AppResult};
use crate::ids::{IdAllocator, IdKind};
use crate::models::{Block, BlockKind, CanvasBody, Project};

impl Project {
    /// Appends a block with the default payload for `kind` and returns its id.
    pub fn add_block(
        &mut self,
        canvas_id: &str,
        kind: BlockKind,
        ids: &mut IdAllocator,
    ) -> AppResult<String> {
        let blocks = self.note_blocks_mut(canvas_id)?;
        let id = ids.allocate(IdKind::Block);
        blocks.push(Block::new(id.clone(), BlockContent::default_for(kind)));
        Ok(id)
    }

    /// Replaces the block with the same id in place. The kind of a block never changes.
    pub fn update_block(&mut self, canvas_id: &str, mut block: Block) -> AppResult<()> {
        let blocks = self.note_blocks_mut(canvas_id)?;
        let existing = blocks
            .iter_mut()
            .find(|existing| existing.id == block.id)
            .ok_or_else(|| AppError::block_not_found(&block.id))?;
        if existing.kind() != block.kind() {
            return Err(AppError::InvalidFormat(format!(
                "block {} is {}, not {}",
                block.id,
                existing.kind().as_str(),
                block.kind().as_str()
            )));
        }
        block.mark_edited();
        *existing = block;
        Ok(())
    }

    pub fn delete_block(&mut self, canvas_id: &str, block_id: &str) -> AppResult<()> {
        let blocks = self.note_blocks_mut(canvas_id)?;
        let index = blocks
            .iter()
            .position(|block| block.id == block_id)
            .ok_or_else(|| AppError::block_not_found(block_id))?;
        blocks.remove(index);
        Ok(())
    }

    /// Moves the block at `from` to `to`. Returns `false` when nothing moved, including
    /// out-of-range indices.
    pub fn reorder_blocks(&mut self, canvas_id: &str, from: usize, to: usize) -> AppResult<bool> {
        let blocks = self.note_blocks_mut(canvas_id)?;
        if from == to || from >= blocks.len() || to >= blocks.len() {
            return Ok(false);
        }
        let moved = blocks.remove(from);
        blocks.insert(to, moved);
        Ok(true)
    }

    fn note_blocks_mut(&mut self, canvas_id: &str) -> AppResult<&mut Vec<Block>> {
        let canvas = self
            .canvas_mut(canvas_id)
            .ok_or_else(|| AppError::canvas_not_found(canvas_id))?;
        match &mut canvas.body {
            CanvasBody::Note { blocks } => Ok(blocks),
            CanvasBody::Playground { .. } => Err(AppError::InvalidFormat(format!(
                "canvas {} is a playground and has no blocks",
                canvas_id
            ))),
        }
    }
}
