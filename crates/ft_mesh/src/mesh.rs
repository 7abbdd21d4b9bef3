// crates/ft_mesh/src/mesh.rs

//! 裂隙网格核心类型
//!
//! `DfnMesh` 采用扁平数组布局（SoA），构建完成后不可变。
//! 拓扑构建逻辑在 [`crate::topology`] 中。

use ft_foundation::error::{FtError, FtResult};
use ft_geo::{FracturePlane, Point3D, Triangle3};
use glam::DVec3;
use smallvec::SmallVec;

// ============================================================
// 原始输入
// ============================================================

/// 网格原始输入数据
///
/// 由读取层（ft_io）从 AVS `.inp` 等文件填充，经
/// [`DfnMesh::build`] 转换为带完整拓扑的网格。
#[derive(Debug, Clone, Default)]
pub struct MeshSource {
    /// 节点坐标
    pub node_coords: Vec<Point3D>,
    /// 节点所属裂隙（0 基）
    pub node_fracture: Vec<u32>,
    /// 单元节点（每单元 3 个，0 基）
    pub cell_nodes: Vec<[u32; 3]>,
    /// 单元所属裂隙（0 基）
    pub cell_fracture: Vec<u32>,
}

// ============================================================
// 节点与单元
// ============================================================

/// 节点类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeKind {
    /// 裂隙内部节点
    #[default]
    Interior,
    /// 外部边界节点（位于只有一个相邻单元的边上）
    Boundary,
    /// 交叉线节点（与其他裂隙上的 twin 节点坐标重合）
    Intersection,
}

/// 网格节点
#[derive(Debug, Clone)]
pub struct Node {
    /// 位置
    pub pos: Point3D,
    /// 所属裂隙（0 基）
    pub fracture: u32,
    /// 节点类别
    pub kind: NodeKind,
    /// 交叉线 twin 节点（其他裂隙上的同位置复制品）
    pub twins: SmallVec<[u32; 2]>,
}

/// 三角形单元
#[derive(Debug, Clone, Copy)]
pub struct Cell {
    /// 三个节点编号
    pub nodes: [u32; 3],
    /// 所属裂隙（0 基）
    pub fracture: u32,
}

impl Cell {
    /// 局部边 i 的两个端点（边 i 为局部顶点 i 的对边）
    #[inline]
    pub fn edge(&self, i: usize) -> (u32, u32) {
        (self.nodes[(i + 1) % 3], self.nodes[(i + 2) % 3])
    }

    /// 节点在单元内的局部编号
    #[inline]
    pub fn local_index(&self, node: u32) -> Option<usize> {
        self.nodes.iter().position(|n| *n == node)
    }
}

// ============================================================
// DfnMesh
// ============================================================

/// 裂隙网络三角网格（构建后不可变）
#[derive(Debug, Clone)]
pub struct DfnMesh {
    /// 节点
    pub nodes: Vec<Node>,
    /// 单元
    pub cells: Vec<Cell>,
    /// 裂隙平面局部坐标系（按裂隙编号索引）
    pub fractures: Vec<FracturePlane>,
    /// 每单元跨局部边 i 的相邻单元（边界边为 None）
    pub neighbors: Vec<[Option<u32>; 3]>,
    /// 每节点的相邻单元列表
    pub node_cells: Vec<SmallVec<[u32; 8]>>,
    /// 单元面积
    pub cell_area: Vec<f64>,
}

impl DfnMesh {
    /// 从原始数据构建网格（入口，见 [`crate::topology::build`]）
    pub fn build(source: MeshSource) -> FtResult<Self> {
        crate::topology::build(source)
    }

    /// 节点数
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// 单元数
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// 裂隙数
    #[inline]
    pub fn n_fractures(&self) -> usize {
        self.fractures.len()
    }

    /// 交叉线节点数
    pub fn n_intersection_nodes(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Intersection)
            .count()
    }

    /// 节点位置（glam 向量）
    #[inline]
    pub fn node_pos(&self, node: u32) -> DVec3 {
        self.nodes[node as usize].pos.to_dvec3()
    }

    /// 单元的三角形几何
    #[inline]
    pub fn triangle(&self, cell: u32) -> Triangle3 {
        let c = &self.cells[cell as usize];
        Triangle3::new(
            self.node_pos(c.nodes[0]),
            self.node_pos(c.nodes[1]),
            self.node_pos(c.nodes[2]),
        )
    }

    /// 单元所属裂隙的平面
    #[inline]
    pub fn cell_plane(&self, cell: u32) -> &FracturePlane {
        &self.fractures[self.cells[cell as usize].fracture as usize]
    }

    /// 单元特征尺寸（面积平方根）
    #[inline]
    pub fn cell_char_length(&self, cell: u32) -> f64 {
        self.cell_area[cell as usize].sqrt()
    }

    /// 跨局部边 i 的相邻单元
    #[inline]
    pub fn neighbor(&self, cell: u32, edge: usize) -> Option<u32> {
        self.neighbors[cell as usize][edge]
    }

    /// 局部边 i 是否为交叉线边（两端点均为交叉线节点）
    pub fn is_intersection_edge(&self, cell: u32, edge: usize) -> bool {
        let (a, b) = self.cells[cell as usize].edge(edge);
        self.nodes[a as usize].kind == NodeKind::Intersection
            && self.nodes[b as usize].kind == NodeKind::Intersection
    }

    /// 某裂隙的所有单元编号
    pub fn fracture_cells(&self, fracture: u32) -> impl Iterator<Item = u32> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, c)| c.fracture == fracture)
            .map(|(i, _)| i as u32)
    }

    /// 节点编号检查
    #[inline]
    pub fn check_node(&self, node: usize) -> FtResult<()> {
        FtError::check_index("Node", node, self.nodes.len())
    }

    /// 单元编号检查
    #[inline]
    pub fn check_cell(&self, cell: usize) -> FtResult<()> {
        FtError::check_index("Cell", cell, self.cells.len())
    }
}

// ============================================================
// 测试
// ============================================================
